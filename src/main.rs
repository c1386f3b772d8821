fn main() -> anyhow::Result<()> {
    orbit_clock::flow::run()
}

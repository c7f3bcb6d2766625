fn main() -> anyhow::Result<()> {
    profsweep_cli::run()
}

fn main() -> anyhow::Result<()> {
    routedoc::cli::run_cli()
}

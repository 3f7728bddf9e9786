fn main() -> anyhow::Result<()> {
    timesheet_recon_cli::run(std::env::args())
}

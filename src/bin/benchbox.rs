use anyhow::Result;

fn main() -> Result<()> {
    benchbox::cli::run()
}

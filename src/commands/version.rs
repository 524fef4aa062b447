use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("hwscope version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

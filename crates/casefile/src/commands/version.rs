pub fn run() -> anyhow::Result<()> {
    println!("casefile {}", env!("CARGO_PKG_VERSION"));
    println!("Hybrid BM25 and TF-IDF search over forensic extraction records");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_output() {
        let result = run();
        assert!(result.is_ok());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    chainscope_cli::run()
}

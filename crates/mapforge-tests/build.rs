fn main() -> Result<(), Box<dyn std::error::Error>> {
    mapforge::build!("schema.json", "mapforge.toml");

    Ok(())
}

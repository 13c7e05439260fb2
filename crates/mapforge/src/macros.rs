/// Build-script helper: generate mappers from a schema snapshot and write
/// them to `OUT_DIR`.
///
/// Takes the path of the JSON snapshot and, optionally, the path of a TOML
/// config (default `mapforge.toml`, used only if present). Every diagnostic
/// becomes a cargo warning. Pull the output in with
/// `include!(concat!(env!("OUT_DIR"), "/mapforge.rs"));`.
#[macro_export]
macro_rules! build {
    ($schema:expr) => {
        $crate::build!($schema, $crate::config::CONFIG_FILE_NAME)
    };
    ($schema:expr, $config:expr) => {
        use std::{env::var, path::PathBuf};

        //
        // CARGO
        //

        println!("cargo:rerun-if-changed=build.rs");
        println!("cargo:rerun-if-changed={}", $schema);
        println!("cargo:rerun-if-changed={}", $config);

        let out_dir = var("OUT_DIR").expect("OUT_DIR not set");

        //
        // MAPPERS
        //

        let generation = $crate::generate_from_files($schema, $config)?;
        for diagnostic in &generation.diagnostics {
            println!("cargo:warning={diagnostic}");
        }

        generation.write_to(PathBuf::from(out_dir))?;
    };
}

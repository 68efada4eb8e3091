use std::path::PathBuf;
use std::process::ExitCode;

use pbrview::app::{App, AppOptions};

const USAGE: &str = "\
usage: viewer [options]
  --mesh <file.ply>        mesh to display
  --albedo <image>         color texture
  --metalness <image>      metalness texture
  --roughness <image>      roughness texture
  --skybox <dir>           environment cube map directory
  --diffuse <dir>          baked diffuse irradiance directory
  --specular <dir>         baked specular irradiance directory
  --out <dir>              bake output root (default: current directory)
";

fn parse_args() -> Result<AppOptions, String> {
    let mut options = AppOptions {
        output_root: PathBuf::from("."),
        ..Default::default()
    };
    let mut args = std::env::args().skip(1);
    while let Some(flag) = args.next() {
        if flag == "--help" || flag == "-h" {
            return Err(String::new());
        }
        let value = args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| format!("missing value for {flag}"))?;
        match flag.as_str() {
            "--mesh" => options.mesh = Some(value),
            "--albedo" => options.albedo = Some(value),
            "--metalness" => options.metalness = Some(value),
            "--roughness" => options.roughness = Some(value),
            "--skybox" => options.skybox = Some(value),
            "--diffuse" => options.diffuse_irradiance = Some(value),
            "--specular" => options.specular_irradiance = Some(value),
            "--out" => options.output_root = value,
            other => return Err(format!("unknown option {other}")),
        }
    }
    Ok(options)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("{message}");
            }
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match App::new(options).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

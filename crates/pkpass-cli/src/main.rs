//! Command-line interface for packaging and signing Apple Wallet passes.
//!
//! Takes a directory containing `pass.json` and image assets, signs the
//! package with a PKCS#12 or PEM-format certificate, and writes the
//! resulting `.pkpass` archive.

use clap::Parser;
use pkpass::package::is_image_entry_name;
use pkpass::{Pass, PassPackage, SigningCredentials};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "pkpass")]
#[command(about = "Apple Wallet pass packaging and signing tool")]
struct Cli {
    /// Directory containing pass.json and image assets (icon.png, logo@2x.png, ...)
    assets: PathBuf,

    /// Output .pkpass file (defaults to the assets directory name with a .pkpass extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pass certificate file (PEM format)
    #[arg(short = 'c', long)]
    certificate: Option<PathBuf>,

    /// Private key file (PEM format)
    #[arg(short = 'k', long)]
    private_key: Option<PathBuf>,

    /// PKCS#12 file (.p12) with certificate and key
    #[arg(short = 'p', long)]
    pkcs12: Option<PathBuf>,

    /// Password for the PKCS#12 file
    #[arg(long)]
    password: Option<String>,

    /// Intermediate (Apple WWDR) certificate, PEM or DER
    #[arg(short = 'i', long)]
    intermediate: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let credentials = load_credentials(&cli)?;

    let pass_json = std::fs::read(cli.assets.join("pass.json"))?;
    let pass = Pass::from_json(&pass_json)?;
    let mut package = PassPackage::new(pass);

    for entry in WalkDir::new(&cli.assets).min_depth(1).max_depth(1) {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_image_entry_name(&name) {
            info!(name = %name, "adding image asset");
            package.add_file(name, std::fs::read(entry.path())?)?;
        }
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.assets.with_extension("pkpass"));

    let archive = package.sign_and_build(&credentials)?;
    std::fs::write(&output, archive)?;

    println!("Signed: {}", output.display());
    Ok(())
}

fn load_credentials(cli: &Cli) -> Result<SigningCredentials, Box<dyn std::error::Error>> {
    let mut credentials = if let Some(ref p12_path) = cli.pkcs12 {
        let p12_data = std::fs::read(p12_path)?;
        let password = cli.password.as_deref().unwrap_or("");
        SigningCredentials::from_p12(&p12_data, password)?
    } else if let (Some(ref cert_path), Some(ref key_path)) = (&cli.certificate, &cli.private_key) {
        let cert_data = std::fs::read(cert_path)?;
        let key_data = std::fs::read(key_path)?;
        SigningCredentials::from_pem(&cert_data, &key_data)?
    } else {
        return Err("Must specify either --pkcs12 or --certificate and --private-key".into());
    };

    if let Some(ref intermediate_path) = cli.intermediate {
        let data = std::fs::read(intermediate_path)?;
        credentials = credentials.with_intermediate_bytes(&data)?;
    }

    Ok(credentials)
}

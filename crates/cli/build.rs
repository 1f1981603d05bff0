use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("pagemark")
        .version("0.2.0")
        .author("Pagemark Contributors")
        .about("Convert web pages into Markdown documents")
        .arg(clap::arg!(<INPUT> "URL to convert, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output Markdown file")
                .required(true)
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--timeout <MS> "Page load timeout in milliseconds").default_value("30000"))
        .arg(clap::arg!(--no_scripts "Disable script execution during page load"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for page requests").value_name("UA"))
        .arg(clap::arg!(-v --verbose "Enable verbose progress output"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "pagemark", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "pagemark", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "pagemark", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "pagemark", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}

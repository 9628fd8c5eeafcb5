use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, Config};
use crate::scoring::{
    validate_indicators, weight_warnings, IndicatorConfig, IndicatorTable, Polarity,
};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Parse a weight typed by the user. Accepts "0.25" or "25%".
fn parse_weight(input: &str) -> Result<f64, String> {
    let input = input.trim();
    let value = if let Some(pct) = input.strip_suffix('%') {
        pct.trim().parse::<f64>().map(|v| v / 100.0)
    } else {
        input.parse::<f64>()
    }
    .map_err(|e| e.to_string())?;

    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err("weight must be a non-negative number".to_string())
    }
}

fn parse_polarity(input: &str) -> Result<Polarity, String> {
    match input.trim().to_lowercase().as_str() {
        "normal" | "n" => Ok(Polarity::Normal),
        "inverted" | "i" => Ok(Polarity::Inverted),
        other => Err(format!("expected 'normal' or 'inverted', got '{}'", other)),
    }
}

fn polarity_label(polarity: Polarity) -> &'static str {
    match polarity {
        Polarity::Normal => "normal",
        Polarity::Inverted => "inverted",
    }
}

fn prompt_indicator(default: &IndicatorConfig) -> Result<IndicatorConfig> {
    let weight = loop {
        let input = prompt_with_default("  Weight", &default.weight.to_string())?;
        match parse_weight(&input) {
            Ok(w) => break w,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };
    let polarity = loop {
        let input = prompt_with_default("  Polarity (normal/inverted)", polarity_label(default.polarity))?;
        match parse_polarity(&input) {
            Ok(p) => break p,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };
    Ok(IndicatorConfig {
        weight,
        polarity,
        ..default.clone()
    })
}

fn prompt_custom_indicator() -> Result<IndicatorConfig> {
    let code = loop {
        let c = prompt("  Series code (e.g., 'DGS10'): ")?;
        if !c.is_empty() {
            break c;
        }
        println!("  Series code is required.");
    };
    let name = prompt_with_default("  Display name", &code)?;
    let template = IndicatorConfig::new(&code, &name, 0.0, Polarity::Normal);
    prompt_indicator(&template)
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Liquidity Score Configuration Wizard");
    println!("====================================");
    println!();

    // 1. Indicators
    println!("Every indicator is scaled to 0-1 over its full history, flipped if its");
    println!("polarity is inverted, then multiplied by its weight. A weight of 0 keeps");
    println!("the series for display only.");
    println!();

    let defaults = IndicatorTable::default();
    let customize = prompt_yes_no("Customize indicators? (n accepts the built-in six)", false)?;

    let indicators = if customize {
        let mut entries = Vec::new();
        for indicator in defaults.iter() {
            println!();
            println!("{} ({})", indicator.name, indicator.code);
            if !prompt_yes_no("  Include?", true)? {
                continue;
            }
            entries.push(prompt_indicator(indicator)?);
        }
        println!();
        while prompt_yes_no("Add another series?", false)? {
            entries.push(prompt_custom_indicator()?);
        }
        IndicatorTable::new(entries)
    } else {
        defaults
    };

    if let Err(errors) = validate_indicators(&indicators) {
        println!();
        println!("The indicator table is not usable:");
        for error in errors {
            println!("  - {}", error);
        }
        println!("Aborted.");
        return Ok(());
    }
    for warning in weight_warnings(&indicators) {
        println!("  Note: {}", warning);
    }

    // 2. Data location
    println!();
    println!("Observations are read from a JSON file (code -> [{{date, value}}]) or a");
    println!("directory of <CODE>.json files, written by your fetch job.");
    let default_data = crate::store::get_data_path();
    let data = prompt_with_default("Observation path", &default_data.display().to_string())?;

    // 3. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 4. Write config
    let config = Config {
        indicators,
        data: Some(data),
        ..Config::default()
    };
    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `liquidity-score score` to get started.");

    Ok(())
}

/// Serialize a config to YAML and write it atomically.
pub fn write_config(path: &std::path::Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}

use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "maps-index" => cmd_maps_index(args),
        "validate" => cmd_validate(args),
        _ => Err(usage()),
    }
}

fn cmd_maps_index(args: Vec<String>) -> Result<(), String> {
    // terrain-tools maps-index <dir> [--out FILE]
    let mut dir: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--out" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    return Err("--out requires a value".to_string());
                };
                out = Some(PathBuf::from(value));
            }
            s if s.starts_with('-') => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
            s if dir.is_none() => dir = Some(PathBuf::from(s)),
            s => return Err(format!("unexpected arg: {s}\n\n{}", usage())),
        }
        i += 1;
    }

    let Some(dir) = dir else {
        return Err(usage());
    };
    let (written, names) = tools::write_maps_index(&dir, out.as_deref())?;
    println!("wrote {} map(s) to {}", names.len(), written.display());
    Ok(())
}

fn cmd_validate(args: Vec<String>) -> Result<(), String> {
    // terrain-tools validate <file> [file2 ...]
    if args.is_empty() {
        return Err(usage());
    }
    for path in args {
        print!("{}", tools::validate_report(&PathBuf::from(path))?);
    }
    Ok(())
}

fn usage() -> String {
    let exe = env::args()
        .next()
        .unwrap_or_else(|| "terrain-tools".to_string());
    format!(
        "Usage:\n  {exe} maps-index <dir> [--out FILE]\n  {exe} validate <file.json> [file2.json ...]\n\nNotes:\n- `maps-index` lists *.json maps (maps.json itself excluded) ordered by the number after the first '_'.\n- `validate` prints chunk sizes, height ranges and mesh totals, then any data warnings.\n"
    )
}

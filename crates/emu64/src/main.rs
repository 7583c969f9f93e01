//! Headless C64 runner.
//!
//! Boots the machine from a ROM set, optionally injects a PRG/T64
//! program and typed text, runs for a while, and can dump the RAM
//! image afterwards. Register-level peripheral traffic is visible with
//! `RUST_LOG=trace`.

use std::path::{Path, PathBuf};
use std::process;

use emu64::{C64, C64Config, C64Model, RomSet, t64};
use emu64_core::{Observable, StepResult};

struct CliArgs {
    roms_dir: Option<PathBuf>,
    prg_path: Option<PathBuf>,
    t64_path: Option<PathBuf>,
    cart_path: Option<PathBuf>,
    model: C64Model,
    game_pin: bool,
    exrom_pin: bool,
    frames: u64,
    instructions: Option<u64>,
    type_text: Option<String>,
    dump_path: Option<PathBuf>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        roms_dir: None,
        prg_path: None,
        t64_path: None,
        cart_path: None,
        model: C64Model::Pal,
        game_pin: true,
        exrom_pin: true,
        frames: 50,
        instructions: None,
        type_text: None,
        dump_path: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--roms" => {
                i += 1;
                cli.roms_dir = args.get(i).map(PathBuf::from);
            }
            "--prg" => {
                i += 1;
                cli.prg_path = args.get(i).map(PathBuf::from);
            }
            "--t64" => {
                i += 1;
                cli.t64_path = args.get(i).map(PathBuf::from);
            }
            "--cart" => {
                i += 1;
                cli.cart_path = args.get(i).map(PathBuf::from);
            }
            "--ntsc" => {
                cli.model = C64Model::Ntsc;
            }
            "--game" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.game_pin = s != "0";
                }
            }
            "--exrom" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.exrom_pin = s != "0";
                }
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(50);
                }
            }
            "--instructions" => {
                i += 1;
                cli.instructions = args.get(i).and_then(|s| s.parse().ok());
            }
            "--type" => {
                i += 1;
                cli.type_text = args.get(i).cloned();
            }
            "--dump" => {
                i += 1;
                cli.dump_path = args.get(i).map(PathBuf::from);
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu64 [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --roms <dir>          ROM directory (default: $C64_ROM_DIR, roms/, .)");
                eprintln!("  --prg <file>          Load a PRG file into memory");
                eprintln!("  --t64 <file>          Load the first program from a T64 container");
                eprintln!("  --cart <file>         Cartridge image for the ROM window at $8000");
                eprintln!("  --ntsc                NTSC model timing [default: PAL]");
                eprintln!("  --game <0|1>          GAME cartridge pin [default: 1]");
                eprintln!("  --exrom <0|1>         EXROM cartridge pin [default: 1]");
                eprintln!("  --frames <n>          Video frames to run [default: 50]");
                eprintln!("  --instructions <n>    Run n instructions instead of frames");
                eprintln!("  --type <text>         Type text via the Kernal queue (\\n for Return)");
                eprintln!("  --dump <file>         Write the 64 KiB RAM image on exit");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn load_file(path: &Path, what: &str) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {what} {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn make_c64(cli: &CliArgs) -> C64 {
    let roms = match cli.roms_dir {
        Some(ref dir) => RomSet::load_from(dir),
        None => RomSet::load(),
    };
    let roms = match roms {
        Ok(roms) => roms,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let config = C64Config {
        model: cli.model,
        kernal_rom: roms.kernal,
        basic_rom: roms.basic,
        char_rom: roms.chargen,
        game_pin: cli.game_pin,
        exrom_pin: cli.exrom_pin,
        cartridge_rom: cli.cart_path.as_ref().map(|p| load_file(p, "cartridge")),
    };

    let mut c64 = match C64::new(&config) {
        Ok(c64) => c64,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(ref path) = cli.prg_path {
        let data = load_file(path, "PRG");
        match c64.load_prg(&data) {
            Ok(addr) => log::info!("loaded PRG at ${addr:04X}: {}", path.display()),
            Err(e) => {
                eprintln!("Failed to load PRG: {e}");
                process::exit(1);
            }
        }
    }

    if let Some(ref path) = cli.t64_path {
        let data = load_file(path, "T64");
        match t64::first_entry(&data) {
            Ok(entry) => {
                let prg = entry.to_prg();
                match c64.load_prg(&prg) {
                    Ok(addr) => log::info!("loaded T64 entry at ${addr:04X}"),
                    Err(e) => {
                        eprintln!("Failed to load T64 entry: {e}");
                        process::exit(1);
                    }
                }
            }
            Err(e) => {
                eprintln!("Failed to parse T64: {e}");
                process::exit(1);
            }
        }
    }

    if let Some(ref text) = cli.type_text {
        c64.type_text(&text.replace("\\n", "\n"));
    }

    c64
}

fn main() {
    env_logger::init();
    let cli = parse_args();
    let mut c64 = make_c64(&cli);

    let halted = if let Some(count) = cli.instructions {
        c64.run(count) == StepResult::Halted
    } else {
        let mut halted = false;
        for _ in 0..cli.frames {
            c64.run_frame();
            if c64.cpu().is_halted() {
                halted = true;
                break;
            }
        }
        halted
    };

    if halted {
        eprintln!(
            "CPU halted at {} (opcode fetch failed)",
            c64.query("cpu.pc").map_or_else(String::new, |v| v.to_string())
        );
    }

    log::info!(
        "ran {} cycles, PC={}",
        c64.master_clock(),
        c64.query("cpu.pc").map_or_else(String::new, |v| v.to_string())
    );

    if let Some(ref path) = cli.dump_path {
        if let Err(e) = std::fs::write(path, c64.dump_ram()) {
            eprintln!("Failed to write RAM dump: {e}");
            process::exit(1);
        }
        eprintln!("RAM image written to {}", path.display());
    }

    if halted {
        process::exit(2);
    }
}

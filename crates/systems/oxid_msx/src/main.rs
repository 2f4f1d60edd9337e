// crates/systems/oxid_msx/src/main.rs
use oxide_core::{Cpu, Memory, Rom};
use oxidz80::{Flag, OxidZ80, Registers};

// LD A,10 ; LD B,5 ; loop: ADD A,B ; INC B ; LD A,B ; DEC A ; LD B,A ; JR loop
const SAMPLE_PROGRAM: [u8; 11] = [0x3E, 0x0A, 0x06, 0x05, 0x80, 0x04, 0x78, 0x3D, 0x47, 0x18, 0xF5];

// ============================================================================
//  CONFIG
// ============================================================================

struct Config {
    prog_path: Option<String>,
    origin: u16,
    max_steps: usize,
    verbosity: u8,
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config {
        prog_path: None,
        origin: 0x0100,
        max_steps: 100,
        verbosity: 0,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-prog" if i + 1 < args.len() => {
                config.prog_path = Some(args[i + 1].clone());
                i += 2;
            }
            "-org" if i + 1 < args.len() => {
                let raw = args[i + 1].trim_start_matches("0x");
                match u16::from_str_radix(raw, 16) {
                    Ok(org) => config.origin = org,
                    Err(_) => eprintln!("Ignoring bad origin '{}'", args[i + 1]),
                }
                i += 2;
            }
            "-steps" if i + 1 < args.len() => {
                match args[i + 1].parse() {
                    Ok(n) => config.max_steps = n,
                    Err(_) => eprintln!("Ignoring bad step count '{}'", args[i + 1]),
                }
                i += 2;
            }
            "-v" => { config.verbosity = 1; i += 1; }
            "-vv" => { config.verbosity = 2; i += 1; }
            "-vvv" => { config.verbosity = 3; i += 1; }
            _ => i += 1,
        }
    }
    config
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

// ============================================================================
//  TRACE
// ============================================================================

fn flag_string(regs: &Registers) -> String {
    [
        (Flag::Sign, 'S'),
        (Flag::Zero, 'Z'),
        (Flag::HalfCarry, 'H'),
        (Flag::ParityOverflow, 'P'),
        (Flag::Subtract, 'N'),
        (Flag::Carry, 'C'),
    ]
    .iter()
    .map(|&(flag, name)| if regs.get_flag(flag) { name } else { '-' })
    .collect()
}

fn log_state(label: &str, regs: &Registers) {
    log::info!(
        "{} PC:{:04X} AF:{:04X} BC:{:04X} DE:{:04X} HL:{:04X} SP:{:04X} [{}]",
        label,
        regs.pc,
        regs.af.word(),
        regs.bc.word(),
        regs.de.word(),
        regs.hl.word(),
        regs.sp,
        flag_string(regs)
    );
}

/// Steps until PC reaches the end of the image at `origin` or `max_steps` run.
/// Returns the number of steps executed.
fn run(cpu: &mut OxidZ80, mem: &mut Memory, origin: u16, len: usize, max_steps: usize) -> usize {
    // An image reaching 0xFFFF has no end address; only the step limit stops it
    let end = origin as usize + len;
    let mut steps = 0;
    while cpu.pc() as usize != end && steps < max_steps {
        let cost = cpu.step(mem);
        steps += 1;
        log::debug!("step {} took {} T-states", steps, cost);
        log_state(&format!("{:>4}", steps), cpu.registers());
    }
    steps
}

// ============================================================================
//  MAIN
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args();
    init_logging(config.verbosity);

    let program = match &config.prog_path {
        Some(path) => Rom::from_file(path)?.data,
        None => SAMPLE_PROGRAM.to_vec(),
    };
    log::info!(
        "--- Oxide MSX --- {} bytes at 0x{:04X} ({})",
        program.len(),
        config.origin,
        config.prog_path.as_deref().unwrap_or("built-in sample")
    );

    let mut mem = Memory::new();
    mem.load(&program, config.origin)?;

    let mut cpu = OxidZ80::new();
    cpu.reset();
    cpu.registers_mut().pc = config.origin;
    log_state("init", cpu.registers());

    let steps = run(&mut cpu, &mut mem, config.origin, program.len(), config.max_steps);
    if steps == config.max_steps {
        log::info!("Step limit of {} reached", config.max_steps);
    }
    log::info!("{} steps, {} T-states", steps, cpu.cycles());
    log::info!("Memory dump:\n{}", mem.dump(config.origin, program.len()));
    Ok(())
}

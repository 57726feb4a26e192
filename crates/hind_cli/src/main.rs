use hind_core::{dump, Cpu, Image};

use log::LevelFilter;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::new()
        .format(|f, record| writeln!(f, "{}: {}", record.level(), record.args()))
        .filter(None, LevelFilter::Warn)
        .parse_default_env()
        .init();

    let mut args = std::env::args().skip(1);
    let path = match (args.next(), args.next()) {
        (Some(path), None) => path,
        _ => {
            eprintln!("usage: hindbaer <binary image>");
            return ExitCode::FAILURE;
        }
    };

    let image = match Image::load(Path::new(&path)) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut cpu = Cpu::new();
    cpu.bus.load_image(&image);
    cpu.run();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let dumped =
        dump::dump_registers(&cpu, &mut out).and_then(|()| dump::dump_memory(cpu.bus.ram(), &mut out));

    match dumped {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

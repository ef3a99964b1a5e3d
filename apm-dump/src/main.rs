use apm_map::{Flags, Map};

use std::fs::File;
use std::io::Write;
use std::process::exit;

use log::error;

const NAMES: &[(Flags, &str)] = &[
    (Flags::DUMMY, "DUMMY"),
    (Flags::OS_SPECIFIC_0, "OS_SPECIFIC_0"),
    (Flags::OS_SPECIFIC_1, "OS_SPECIFIC_1"),
    (Flags::OS_SPECIFIC_2, "OS_SPECIFIC_2"),
    (Flags::OS_PIC_CODE, "OS_PIC_CODE"),
    (Flags::WRITABLE, "WRITABLE"),
    (Flags::READABLE, "READABLE"),
    (Flags::BOOTABLE, "BOOTABLE"),
    (Flags::IN_USE, "IN_USE"),
    (Flags::ALLOCATED, "ALLOCATED"),
    (Flags::VALID, "VALID"),
];

fn usage(code: i32) -> ! {
    let text = "Usage: apm-dump -r|--read <inputfile>\n";
    match code {
        0 => print!("{}", text),
        _ => eprint!("{}", text),
    }

    exit(code)
}

fn flags(flags: Flags) -> String {
    let mut names = Vec::new();
    let mut rest = flags.bits();

    for (flag, name) in NAMES {
        if flags.contains(*flag) {
            names.push(name.to_string());
            rest &= !flag.bits();
        }
    }

    if rest != 0 {
        names.push(format!("{:#x}", rest));
    }

    names.join("|")
}

fn dump(map: &Map, mut out: impl Write) -> std::io::Result<()> {
    writeln!(out, "Got apple partition map at {:#x}", map.offset())?;
    writeln!(
        out,
        "BlockSize {}, BlockCount {}",
        map.block_size(),
        map.device_block_count()
    )?;
    writeln!(out, "Flags: {}", flags(map.map_flags()))?;

    for i in 0..map.partition_count() {
        // Indices below partition_count() are always in range.
        let part = match map.partition(i) {
            Ok(part) => part,
            Err(..) => break,
        };

        writeln!(
            out,
            " partition \"{}\" of type \"{}\" at {:#x} uses {} block{}",
            String::from_utf8_lossy(part.name()),
            String::from_utf8_lossy(part.kind()),
            part.pblock_start,
            part.pblocks,
            if part.pblocks == 1 { "" } else { "s" },
        )?;
        writeln!(out, "  flags: {}", flags(part.flags()))?;
    }

    Ok(())
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Read(String),
    Usage,
}

fn parse(args: &[&str]) -> Command {
    match *args {
        ["--help"] | ["--usage"] | ["-?"] | ["-h"] => Command::Help,
        ["-r", path] | ["--read", path] => Command::Read(path.to_string()),
        _ => Command::Usage,
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(|x| x.as_str()).collect();
    let path = match parse(&args) {
        Command::Help => usage(0),
        Command::Read(path) => path,
        Command::Usage => usage(1),
    };

    let mut file = match File::open(&path) {
        Ok(file) => file,
        Err(e) => {
            error!("cannot open \"{}\": {}", path, e);
            exit(2);
        }
    };

    let map = match Map::load(&mut file) {
        Ok(map) => map,
        Err(e) => {
            error!("cannot parse \"{}\": {}", path, e);
            exit(3);
        }
    };

    if let Err(e) = dump(&map, std::io::stdout().lock()) {
        error!("cannot write output: {}", e);
        exit(4);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::io::{Seek, SeekFrom};

    #[test]
    fn arguments() {
        assert_eq!(parse(&["-h"]), Command::Help);
        assert_eq!(parse(&["--usage"]), Command::Help);
        assert_eq!(parse(&["-r", "disk.img"]), Command::Read("disk.img".into()));
        assert_eq!(parse(&["--read", "disk.img"]), Command::Read("disk.img".into()));

        // The read flag is required.
        assert_eq!(parse(&["disk.img"]), Command::Usage);
        assert_eq!(parse(&[]), Command::Usage);
        assert_eq!(parse(&["-r"]), Command::Usage);
        assert_eq!(parse(&["-r", "a", "b"]), Command::Usage);
    }

    #[test]
    fn names() {
        assert_eq!(flags(Flags::VALID | Flags::ALLOCATED), "ALLOCATED|VALID");
        assert_eq!(flags(Flags::empty()), "");
        assert_eq!(
            flags(Flags::from_bits_retain(0x8000_0009)),
            "BOOTABLE|VALID|0x80000000"
        );
    }

    #[test]
    fn output() {
        let mut map = Map::create_default();
        map.set_device_block_count(100);
        let p = map.add_partition().unwrap();
        map.set_partition_start(p, 8).unwrap();
        map.set_partition_blocks(p, 1).unwrap();
        map.set_partition_name(p, "Extra").unwrap();
        map.set_partition_type(p, "Apple_HFS").unwrap();
        map.set_partition_flags(p, Flags::VALID | Flags::READABLE).unwrap();

        let mut file = tempfile::tempfile().unwrap();
        map.save(&mut file).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let map = Map::load(&mut file).unwrap();

        let mut out = Vec::new();
        dump(&map, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Got apple partition map at 0x0\n\
             BlockSize 512, BlockCount 100\n\
             Flags: ALLOCATED|VALID\n \
             partition \"Extra\" of type \"Apple_HFS\" at 0x8 uses 1 block\n  \
             flags: READABLE|VALID\n"
        );
    }
}

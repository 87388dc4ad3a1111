use cache_sim::signal::Control;

peg::parser!(pub(crate) grammar command() for str {
    rule radix() -> u64
        = quiet!{"0" ['x' | 'X']} n:$(quiet!{['0'..='9'|'a'..='f'|'A'..='F'|'_']+}) {?
            u64::from_str_radix(&n.replace('_', ""), 16).map_err(|_| "hexadecimal number")
        }
        / quiet!{"0" ['d' | 'D']} n:$(quiet!{['0'..='9']+}) {? n.parse().map_err(|_| "decimal number") }
        / quiet!{"0" ['o' | 'O']} n:$(quiet!{['0'..='7']+}) {?
            u64::from_str_radix(n, 8).map_err(|_| "octal number")
        }
        / n:$(quiet!{['0'..='9']+}) {? n.parse().map_err(|_| "decimal number") }
        / expected!("number")
    rule word() -> u32
        = n:radix() {? u32::try_from(n).map_err(|_| "32-bit value") }
    rule usize() -> usize
        = n:radix() {? usize::try_from(n).map_err(|_| "index") }

    rule write() = "write" / "w"
    rule read() = "read" / "r"
    rule drive() -> Command
        = "drive" rst:(__ "reset")? we:(__ "we")? re:(__ "re")?
          address:(__ a:word() { a })? data:(__ d:word() { d })? {
            let mut control = Control::none();
            if rst.is_some() {
                control |= Control::Reset;
            }
            if we.is_some() {
                control |= Control::Write;
            }
            if re.is_some() {
                control |= Control::Read;
            }
            Command::Drive {
                control,
                address: address.unwrap_or_default(),
                data: data.unwrap_or_default(),
            }
        }
    rule show_kind() -> ShowKind
        = "line" __ index:usize() { ShowKind::Line(index) }
        / "addr" "ess"? __ address:word() { ShowKind::Address(address) }
        / "cycle" { ShowKind::Cycle }
        / "config" { ShowKind::Config }
        / "stat" { ShowKind::Stat }
        / "out" "puts"? { ShowKind::Outputs }
    rule cmd() -> Command
        = "reset" { Command::Reset }
        / write() __ address:word() __ data:word() { Command::Write { address, data } }
        / read() __ address:word() { Command::Read { address } }
        / "idle" n:(__ n:usize() { n })? { Command::Idle(n.unwrap_or(1)) }
        / drive()
        / "show" __ k:show_kind() { Command::Show(k) }
        / ("exit" / "quit") { Command::Exit }
    rule comment() = "#" [_]*
    pub(crate) rule parse_command() -> Command
        = _ c:cmd()? _ comment()? { c.unwrap_or(Command::Nop) }

    rule ws() = quiet!{[' ' | '\t' | '\r' | '\n']}
        / expected!("whitespace")
    rule _() = ws()*
    rule __() = ws()+
});

pub(crate) use self::command::parse_command;

pub(crate) enum Command {
    Reset,
    Write { address: u32, data: u32 },
    Read { address: u32 },
    Idle(usize),
    /// one raw edge with arbitrary control pins
    Drive {
        control: Control,
        address: u32,
        data: u32,
    },
    Show(ShowKind),
    Exit,
    Nop,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ShowKind {
    Line(usize),
    Address(u32),
    Cycle,
    Config,
    Stat,
    Outputs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert!(matches!(
            parse_command("write 0x123456 0xDEAD_BEEF"),
            Ok(Command::Write {
                address: 0x12_3456,
                data: 0xDEADBEEF
            })
        ));
        assert!(matches!(
            parse_command("w 0d10 0o17\n"),
            Ok(Command::Write {
                address: 10,
                data: 15
            })
        ));
        assert!(matches!(
            parse_command("  r 42  "),
            Ok(Command::Read { address: 42 })
        ));
        assert!(parse_command("read 0x100000000").is_err());
    }
    #[test]
    fn test_commands() {
        assert!(matches!(parse_command("reset"), Ok(Command::Reset)));
        assert!(matches!(parse_command("idle"), Ok(Command::Idle(1))));
        assert!(matches!(parse_command("idle 4"), Ok(Command::Idle(4))));
        assert!(matches!(parse_command("exit"), Ok(Command::Exit)));
        assert!(matches!(parse_command(""), Ok(Command::Nop)));
        assert!(matches!(
            parse_command("# write then read"),
            Ok(Command::Nop)
        ));
        assert!(matches!(
            parse_command("read 0x10 # probe"),
            Ok(Command::Read { address: 0x10 })
        ));
        assert!(parse_command("write 0x10").is_err());
        assert!(parse_command("jump 0x10").is_err());
    }
    #[test]
    fn test_show() {
        for (src, kind) in [
            ("show line 3", ShowKind::Line(3)),
            ("show addr 0x10", ShowKind::Address(0x10)),
            ("show address 0x10", ShowKind::Address(0x10)),
            ("show cycle", ShowKind::Cycle),
            ("show config", ShowKind::Config),
            ("show stat", ShowKind::Stat),
            ("show outputs", ShowKind::Outputs),
        ] {
            match parse_command(src) {
                Ok(Command::Show(k)) => assert_eq!(kind, k),
                _ => panic!("failed to parse `{src}`"),
            }
        }
    }
    #[test]
    fn test_drive() {
        match parse_command("drive we re 0x35 7") {
            Ok(Command::Drive {
                control,
                address,
                data,
            }) => {
                assert!(control.contains(Control::Write | Control::Read));
                assert!(!control.contains(Control::Reset));
                assert_eq!((0x35, 7), (address, data));
            }
            _ => panic!("failed to parse drive"),
        }
        match parse_command("drive reset") {
            Ok(Command::Drive {
                control, address, ..
            }) => {
                assert!(control == Control::Reset);
                assert_eq!(0, address);
            }
            _ => panic!("failed to parse drive reset"),
        }
        match parse_command("drive re 0x10") {
            Ok(Command::Drive { control, .. }) => assert!(control == Control::Read),
            _ => panic!("failed to parse drive re"),
        }
    }
}

pub const USAGE: &str = "\
usage:
  create <field>=<entry> ...     e.g. create temperatura=DHT11$260$°C$-1 pressao=BMP180$180$hPa$-1
  create-json <json>             e.g. create-json '{\"temperatura\": [\"DHT11$260$°C$-1\"]}'
  recent [limit]
  range <from> <to>
  day <date>
  stats
  ping
  reset";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Create { pairs: Vec<(String, String)> },
    CreateJson { json: String },
    Recent { limit: Option<u64> },
    Range { from: String, to: String },
    Day { day: String },
    Stats,
    Ping,
    Reset,
    Help,
    Unknown(String),
}

impl AppCommand {
    /// Parses the argument list (program name excluded). Dates may contain
    /// spaces, so each argument is taken whole.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = args.into_iter().map(Into::into).collect();
        let Some(cmd) = parts.first() else {
            return AppCommand::Help;
        };

        match cmd.as_str() {
            "create" => {
                if parts.len() < 2 {
                    return AppCommand::Unknown("usage: create <field>=<entry> ...".to_string());
                }
                let mut pairs = Vec::with_capacity(parts.len() - 1);
                for arg in &parts[1..] {
                    match arg.split_once('=') {
                        Some((k, v)) => pairs.push((k.to_string(), v.to_string())),
                        None => {
                            return AppCommand::Unknown(format!(
                                "invalid argument {:?}, expected <field>=<entry>",
                                arg
                            ))
                        }
                    }
                }
                AppCommand::Create { pairs }
            }
            "create-json" => match parts.get(1) {
                Some(json) => AppCommand::CreateJson { json: json.clone() },
                None => AppCommand::Unknown("usage: create-json <json>".to_string()),
            },
            "recent" => match parts.get(1) {
                None => AppCommand::Recent { limit: None },
                Some(raw) => match raw.parse::<u64>() {
                    Ok(limit) => AppCommand::Recent { limit: Some(limit) },
                    Err(_) => AppCommand::Unknown("usage: recent [limit]".to_string()),
                },
            },
            "range" => match (parts.get(1), parts.get(2)) {
                (Some(from), Some(to)) => AppCommand::Range {
                    from: from.clone(),
                    to: to.clone(),
                },
                _ => AppCommand::Unknown("usage: range <from> <to>".to_string()),
            },
            "day" => match parts.get(1) {
                Some(day) => AppCommand::Day { day: day.clone() },
                None => AppCommand::Unknown("usage: day <date>".to_string()),
            },
            "stats" => AppCommand::Stats,
            "ping" => AppCommand::Ping,
            "reset" => AppCommand::Reset,
            "help" | "-h" | "--help" => AppCommand::Help,
            other => AppCommand::Unknown(format!("unknown command: {}", other)),
        }
    }
}

pub const WELCOME: &str = "Benvenuto nel Bot delle Estrazioni del Lotto!

Usa /ultima per ottenere gli ultimi risultati del lotto italiano.

Comando disponibile:
/ultima - Mostra i risultati più recenti";

pub const HELP: &str = "Bot per le Estrazioni del Lotto Italiano

Comandi disponibili:
/ultima - Ottieni gli ultimi risultati del lotto
/lotto, /latest - Come /ultima

I risultati vengono recuperati da RAI Televideo.";

pub const UNKNOWN: &str = "Comando sconosciuto.

Comandi disponibili:
/help - Mostra informazioni di aiuto
/ultima - Ottieni gli ultimi risultati del lotto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// `/ultima`, or its aliases `/lotto` and `/latest`.
    Latest,
    Unknown(String),
}

impl Command {
    /// Read a command from message text. Text not starting with `/` is
    /// not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?.strip_prefix('/')?;
        // Group chats address commands as /ultima@SomeBot.
        let name = word.split('@').next().unwrap_or(word).to_lowercase();

        Some(match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "ultima" | "lotto" | "latest" => Command::Latest,
            _ => Command::Unknown(name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/ultima"), Some(Command::Latest));
        assert_eq!(Command::parse("/lotto"), Some(Command::Latest));
        assert_eq!(Command::parse("/latest"), Some(Command::Latest));
        assert_eq!(Command::parse("  /ULTIMA  "), Some(Command::Latest));
    }

    #[test]
    fn test_parse_strips_bot_name() {
        assert_eq!(Command::parse("/ultima@EstrazioniBot"), Some(Command::Latest));
        assert_eq!(Command::parse("/help@EstrazioniBot extra"), Some(Command::Help));
    }

    #[test]
    fn test_parse_unknown_and_plain_text() {
        assert_eq!(
            Command::parse("/vinci"),
            Some(Command::Unknown("vinci".to_string()))
        );
        assert_eq!(Command::parse("ciao"), None);
        assert_eq!(Command::parse(""), None);
    }
}

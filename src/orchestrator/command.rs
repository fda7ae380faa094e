//! 终端命令解析

/// 终端中可用的命令；其余输入行都追加到申请草稿中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Submit,
    Retry,
    Reset,
    Details,
    Status,
    Help,
    Quit,
}

impl Command {
    /// 解析一行输入；不是命令时返回 `None`
    pub fn parse(line: &str) -> Option<Self> {
        let command = match line.trim() {
            "/submit" | "/envoyer" => Command::Submit,
            "/retry" | "/reessayer" => Command::Retry,
            "/reset" | "/nouvelle" => Command::Reset,
            "/details" => Command::Details,
            "/status" => Command::Status,
            "/help" | "/?" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}

pub const HELP: &str = "\
Saisissez la demande de prêt (plusieurs lignes possibles), puis :
  /submit   envoyer la demande
  /retry    renvoyer la dernière demande
  /reset    nouvelle demande
  /details  afficher/masquer l'analyse détaillée
  /status   état des services
  /quit     quitter";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/submit"), Some(Command::Submit));
        assert_eq!(Command::parse("  /retry \r"), Some(Command::Retry));
        assert_eq!(Command::parse("/nouvelle"), Some(Command::Reset));
        assert_eq!(Command::parse("/quit"), Some(Command::Quit));
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(Command::parse("CLIENT_ID: client-042"), None);
        assert_eq!(Command::parse("/submit maintenant"), None);
        assert_eq!(Command::parse(""), None);
    }
}

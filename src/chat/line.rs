//! IRC protocol line parsing.

/// A parsed IRC line: `[:prefix] COMMAND [params...] [:trailing]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcLine<'a> {
    /// Message source, without the leading `:`.
    pub prefix: Option<&'a str>,
    /// Command name or three-digit numeric reply.
    pub command: &'a str,
    /// Parameters; the trailing parameter is last, without its `:`.
    pub params: Vec<&'a str>,
}

impl<'a> IrcLine<'a> {
    /// Parse one line. Returns `None` for empty lines.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => {
                let (prefix, remainder) = stripped.split_once(' ').unwrap_or((stripped, ""));
                rest = remainder;
                Some(prefix)
            }
            None => None,
        };

        rest = rest.trim_start_matches(' ');
        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return None;
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing);
                break;
            }
            let (param, remainder) = rest.split_once(' ').unwrap_or((rest, ""));
            params.push(param);
            rest = remainder;
        }

        Some(Self {
            prefix,
            command,
            params,
        })
    }

    /// Last parameter, if any.
    pub fn trailing(&self) -> Option<&'a str> {
        self.params.last().copied()
    }
}

/// Make `text` safe to embed as a single IRC parameter.
pub(crate) fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\r' || c == '\n' || c == '\0' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ping() {
        let line = IrcLine::parse("PING :irc.example.com\r\n").unwrap();
        assert_eq!(line.prefix, None);
        assert_eq!(line.command, "PING");
        assert_eq!(line.params, vec!["irc.example.com"]);
    }

    #[test]
    fn test_parse_welcome() {
        let line = IrcLine::parse(":irc.example.com 001 os-jenkins :Welcome to IRC").unwrap();
        assert_eq!(line.prefix, Some("irc.example.com"));
        assert_eq!(line.command, "001");
        assert_eq!(line.params, vec!["os-jenkins", "Welcome to IRC"]);
        assert_eq!(line.trailing(), Some("Welcome to IRC"));
    }

    #[test]
    fn test_parse_without_trailing() {
        let line = IrcLine::parse(":nick!user@host JOIN #ci").unwrap();
        assert_eq!(line.command, "JOIN");
        assert_eq!(line.params, vec!["#ci"]);
    }

    #[test]
    fn test_parse_trailing_with_colons() {
        let line = IrcLine::parse("NOTICE #ci :PR#7: done :)").unwrap();
        assert_eq!(line.params, vec!["#ci", "PR#7: done :)"]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(IrcLine::parse("").is_none());
        assert!(IrcLine::parse("\r\n").is_none());
        assert!(IrcLine::parse(":prefix-only").is_none());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("a\r\nb"), "a  b");
        assert_eq!(sanitize("\x02bold\x0F"), "\x02bold\x0F");
    }
}

use heapless::Vec;

/// Maximum length of a command token. Longer writes are truncated.
pub const TOKEN_CAPACITY: usize = 16;

/// Where the peer is in the programming protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionState {
    /// No programming session.
    #[default]
    Idle,
    /// `"prg"` received; the controller is about to program the sampler.
    ProgrammingOpen,
    /// `"set"` received; the next write carries a register set payload.
    Setting,
}

/// What a command token asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    /// `"prg"`
    Program,
    /// `"end"`
    End,
    /// Anything starting with `"set"`.
    Set,
    /// `"endset"`
    EndSet,
    /// Any other token, including `"get"`.
    Other,
}

/// The current command: the ASCII bytes of the last controller write,
/// after any binary payload.
///
/// Bounded to [`TOKEN_CAPACITY`] bytes; excess bytes are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandToken {
    bytes: Vec<u8, TOKEN_CAPACITY>,
}

impl CommandToken {
    /// An empty token.
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// The token's raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns `true` if the token is exactly `command`.
    pub fn is(&self, command: &[u8]) -> bool {
        self.bytes.as_slice() == command
    }

    /// Returns `true` if no bytes were received.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Append one byte, dropping it once the token is full.
    pub(crate) fn push(&mut self, byte: u8) {
        let _ = self.bytes.push(byte);
    }

    /// Reduce a `"set..."` token to exactly `"set"`.
    pub(crate) fn normalize_set(&mut self) {
        self.bytes.truncate(3);
    }

    pub(crate) fn command(&self) -> Command {
        match self.bytes.as_slice() {
            b"prg" => Command::Program,
            b"end" => Command::End,
            [b's', b'e', b't', ..] => Command::Set,
            b"endset" => Command::EndSet,
            _ => Command::Other,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CommandToken {
    fn format(&self, f: defmt::Formatter) {
        match core::str::from_utf8(&self.bytes) {
            Ok(text) => defmt::write!(f, "{=str}", text),
            Err(_) => defmt::write!(f, "{=[u8]}", self.bytes.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(bytes: &[u8]) -> CommandToken {
        let mut token = CommandToken::new();
        for &byte in bytes {
            token.push(byte);
        }
        token
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(TransactionState::default(), TransactionState::Idle);
    }

    #[test]
    fn commands_are_classified() {
        assert_eq!(token(b"prg").command(), Command::Program);
        assert_eq!(token(b"end").command(), Command::End);
        assert_eq!(token(b"set").command(), Command::Set);
        assert_eq!(token(b"set42").command(), Command::Set);
        assert_eq!(token(b"endset").command(), Command::EndSet);
        assert_eq!(token(b"get").command(), Command::Other);
        assert_eq!(token(b"").command(), Command::Other);
        assert_eq!(token(b"se").command(), Command::Other);
        assert_eq!(token(b"PRG").command(), Command::Other);
    }

    #[test]
    fn normalize_set_keeps_prefix() {
        let mut token = token(b"setup");
        token.normalize_set();
        assert!(token.is(b"set"));
    }

    #[test]
    fn token_is_bounded() {
        let long = [b'x'; TOKEN_CAPACITY + 8];
        let token = token(&long);
        assert_eq!(token.as_bytes().len(), TOKEN_CAPACITY);
    }

    #[test]
    fn clear_empties_token() {
        let mut token = token(b"get");
        token.clear();
        assert!(token.is_empty());
        assert!(!token.is(b"get"));
    }
}

use crate::frame::op;

/// The kind of record a lexed token represents.
///
/// This mirrors the opcode table of the MCAP format. Ordinarily a `Chunk`
/// record is consumed internally by the chunk loader and never surfaces as
/// a token — its contents surface instead as the token kinds of the
/// records nested inside it. The exception is `Options::emit_chunks`: with
/// that set, the chunk loader is bypassed entirely and `Chunk` records are
/// handed back raw and undecoded, so `TokenKind::Chunk` exists for that
/// mode. Opcode zero is reserved and always rejected before
/// classification, so it has no `TokenKind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Header,
    Footer,
    Schema,
    Channel,
    Message,
    Chunk,
    MessageIndex,
    ChunkIndex,
    Attachment,
    AttachmentIndex,
    Statistics,
    Metadata,
    MetadataIndex,
    SummaryOffset,
    DataEnd,
}

impl TokenKind {
    /// Maps a wire opcode to a `TokenKind`. Returns `None` for opcodes this
    /// lexer never surfaces as tokens under any configuration: any opcode
    /// outside the known table, which the lexer skips rather than rejects.
    /// The chunk opcode does map to `TokenKind::Chunk`, but callers will
    /// only ever observe it when `Options::emit_chunks` is set — otherwise
    /// the chunk loader consumes the record before classification.
    pub fn from_opcode(opcode: u8) -> Option<TokenKind> {
        match opcode {
            op::HEADER => Some(TokenKind::Header),
            op::FOOTER => Some(TokenKind::Footer),
            op::SCHEMA => Some(TokenKind::Schema),
            op::CHANNEL => Some(TokenKind::Channel),
            op::MESSAGE => Some(TokenKind::Message),
            op::CHUNK => Some(TokenKind::Chunk),
            op::MESSAGE_INDEX => Some(TokenKind::MessageIndex),
            op::CHUNK_INDEX => Some(TokenKind::ChunkIndex),
            op::ATTACHMENT => Some(TokenKind::Attachment),
            op::ATTACHMENT_INDEX => Some(TokenKind::AttachmentIndex),
            op::STATISTICS => Some(TokenKind::Statistics),
            op::METADATA => Some(TokenKind::Metadata),
            op::METADATA_INDEX => Some(TokenKind::MetadataIndex),
            op::SUMMARY_OFFSET => Some(TokenKind::SummaryOffset),
            op::DATA_END => Some(TokenKind::DataEnd),
            _ => None,
        }
    }
}

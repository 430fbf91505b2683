use thiserror::Error;

/// Ways an ingestion call can fail. The display strings are user-facing and
/// follow the product locale (pt-BR).
#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("Formato de arquivo não suportado. Envie um arquivo PDF ou DOCX.")]
    UnsupportedFormat,

    #[error(
        "Arquivos .doc (Word 97-2003) não são suportados. \
         Salve o documento como .docx ou PDF e envie novamente."
    )]
    LegacyDoc,

    #[error("Não foi possível abrir o PDF. O arquivo pode estar corrompido ou protegido por senha.")]
    PdfOpen,

    #[error("O PDF não contém nenhuma página.")]
    EmptyPdf,

    #[error("Não foi possível ler texto do PDF digitalizado. Envie um arquivo com melhor qualidade.")]
    UnreadableScan,

    #[error("O documento DOCX está vazio ou não pôde ser lido.")]
    EmptyDocx,

    #[error(
        "Não foi possível inicializar o OCR para este PDF digitalizado. \
         Tente enviar um PDF com texto selecionável."
    )]
    OcrInit(String),

    #[error("Erro desconhecido ao processar o documento: {0}")]
    Unknown(String),
}

impl ExtractionError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            ExtractionError::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ExtractionError::LegacyDoc => "LEGACY_DOC_UNSUPPORTED",
            ExtractionError::PdfOpen => "PDF_OPEN_FAILED",
            ExtractionError::EmptyPdf => "EMPTY_PDF",
            ExtractionError::UnreadableScan => "UNREADABLE_SCAN",
            ExtractionError::EmptyDocx => "EMPTY_DOCX",
            ExtractionError::OcrInit(_) => "OCR_INIT_FAILED",
            ExtractionError::Unknown(_) => "EXTRACTION_FAILED",
        }
    }

    /// Input and content problems are the client's to fix; the rest are ours.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ExtractionError::Unknown(_))
    }
}

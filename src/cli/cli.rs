#[derive(Debug, Clone)]
pub enum MenuAction {
    EnrichCompany,
    EnrichBatch,
    QuickEnrichUrl,
    ExtractFromText,
    ResetEnrichment,
    ExportCompanies,
    ShowStats,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::EnrichCompany => {
                write!(f, "🔍 Enrich a single company by name")
            }
            MenuAction::EnrichBatch => {
                write!(f, "🌊 Batch enrich pending companies")
            }
            MenuAction::QuickEnrichUrl => {
                write!(f, "⚡ Quick-enrich a website URL (no database)")
            }
            MenuAction::ExtractFromText => {
                write!(f, "📋 Extract contacts from pasted text")
            }
            MenuAction::ResetEnrichment => {
                write!(f, "♻️  Reset a company's enrichment status")
            }
            MenuAction::ExportCompanies => {
                write!(f, "📤 Export enriched companies to JSON")
            }
            MenuAction::ShowStats => {
                write!(f, "📊 Show database statistics")
            }
            MenuAction::Exit => {
                write!(f, "🚪 Exit")
            }
        }
    }
}

pub mod cli;
mod run;
mod run_enrich_batch;
mod run_enrich_company;
mod run_export_companies;
mod run_extract_text;
mod run_quick_enrich;
mod run_reset_enrichment;
mod show_database_stats;

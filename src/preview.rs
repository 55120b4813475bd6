//! `mpw preview`: print the social preview page for a story.
//!
//! Produces exactly what `GET /story/{id}` serves, without starting the
//! server. Useful for checking tags before sharing a link.

use anyhow::Result;
use microplastics_watch_core::api::StoryApi;
use microplastics_watch_core::preview::preview_for;

use crate::config::Config;

pub async fn run_preview(config: &Config, api: &dyn StoryApi, id: &str) -> Result<()> {
    let html = preview_for(api, &config.site, id).await;
    print!("{}", html);
    Ok(())
}

//! Provider registry.
//!
//! Maps a task's provider link to the field mapper for that provider.
//! Mappers are stateless, so a single static instance serves every task.

use tasksync_core::{FieldMapper, ProviderKind};
use tasksync_provider_google::GoogleTasksMapper;
use tasksync_provider_outlook::OutlookTasksMapper;

static GOOGLE: GoogleTasksMapper = GoogleTasksMapper;
static OUTLOOK: OutlookTasksMapper = OutlookTasksMapper;

pub fn mapper_for(kind: ProviderKind) -> &'static dyn FieldMapper {
    match kind {
        ProviderKind::Google => &GOOGLE,
        ProviderKind::Outlook => &OUTLOOK,
    }
}

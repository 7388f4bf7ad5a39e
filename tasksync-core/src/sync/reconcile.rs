//! The reconciliation orchestrator.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{MappingError, SyncError, SyncResult};
use crate::field::{FieldValue, TaskField};
use crate::mapper::{CandidateValue, FieldMapper, TaskCandidate};
use crate::mapping::FieldMappingEntry;
use crate::payload::ExternalTaskPayload;
use crate::sync::outcome::{FieldDecision, FieldOutcome, KeepReason, SyncOutcome};
use crate::sync::policy::{ConflictResolution, SyncPolicy};
use crate::task::TaskRecord;

/// One task's inputs for `Reconciler::reconcile_batch`.
pub struct SyncInput<'a> {
    pub task: &'a TaskRecord,
    pub payload: Value,
    /// Payload as it was at the end of the last successful sync.
    pub snapshot: Option<Value>,
}

/// Merges fetched provider payloads into local tasks, one field at a time.
///
/// Holds no mutable state; a single reconciler can serve any number of
/// tasks concurrently.
#[derive(Clone)]
pub struct Reconciler<'m> {
    mapper: &'m dyn FieldMapper,
    policy: SyncPolicy,
}

impl<'m> Reconciler<'m> {
    pub fn new(mapper: &'m dyn FieldMapper) -> Self {
        Reconciler {
            mapper,
            policy: SyncPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mapper(&self) -> &'m dyn FieldMapper {
        self.mapper
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Reconcile raw JSON as fetched from the provider. A payload that is
    /// not an object is a fatal error for this task.
    pub fn reconcile_value(
        &self,
        existing: &TaskRecord,
        payload: Value,
        snapshot: Option<Value>,
    ) -> SyncResult<SyncOutcome> {
        let payload = ExternalTaskPayload::from_value(payload)?;
        let snapshot = snapshot.map(ExternalTaskPayload::from_value).transpose()?;
        self.reconcile(existing, &payload, snapshot.as_ref())
    }

    /// Merge `payload` into `existing`. With a `snapshot` of the payload
    /// from the last sync, fields edited on only one side keep that side's
    /// value and fields edited on both sides go through the conflict policy.
    pub fn reconcile(
        &self,
        existing: &TaskRecord,
        payload: &ExternalTaskPayload,
        snapshot: Option<&ExternalTaskPayload>,
    ) -> SyncResult<SyncOutcome> {
        self.check_link(existing, payload)?;

        let candidate = self.mapper.to_internal(payload, existing);
        let baseline = snapshot.map(|s| self.mapper.to_internal(s, existing));

        let mut merged = existing.clone();
        let mut decisions = Vec::with_capacity(self.mapper.entries().len());

        for entry in self.mapper.entries() {
            let field = entry.internal_field;
            let decision = self.decide(entry, existing, &candidate, baseline.as_ref());

            let decision = match adopted_value(&decision) {
                Some(value) => match merged.set(field, value.clone()) {
                    Ok(()) => decision,
                    Err(e) => mapping_failed(&existing.id, MappingError::new(field, e)),
                },
                None => decision,
            };

            decisions.push(FieldOutcome { field, decision });
        }

        debug!(
            task = %existing.id,
            provider = %self.mapper.provider(),
            "Reconciled {} fields",
            decisions.len()
        );

        Ok(SyncOutcome {
            task: merged,
            decisions,
        })
    }

    /// Reconcile several tasks. Each result stands alone: a fatal error
    /// for one task does not affect the others.
    pub fn reconcile_batch<'a>(
        &self,
        inputs: impl IntoIterator<Item = SyncInput<'a>>,
    ) -> Vec<(String, SyncResult<SyncOutcome>)> {
        inputs
            .into_iter()
            .map(|input| {
                let result = self.reconcile_value(input.task, input.payload, input.snapshot);
                if let Err(e) = &result {
                    warn!(task = %input.task.id, "Sync failed: {}", e);
                }
                (input.task.id.clone(), result)
            })
            .collect()
    }

    /// Outbound payload for the merged task.
    pub fn outbound(&self, outcome: &SyncOutcome) -> SyncResult<ExternalTaskPayload> {
        Ok(self.mapper.to_external(&outcome.task)?)
    }

    fn check_link(&self, task: &TaskRecord, payload: &ExternalTaskPayload) -> SyncResult<()> {
        let link = task
            .link
            .as_ref()
            .ok_or_else(|| SyncError::NotLinked(task.id.clone()))?;

        if link.provider != self.mapper.provider() {
            return Err(SyncError::ProviderMismatch {
                task: task.id.clone(),
                linked: link.provider,
                mapper: self.mapper.provider(),
            });
        }

        match self.mapper.external_id(payload) {
            Some(found) if found != link.external_id => Err(SyncError::LinkMismatch {
                task: task.id.clone(),
                expected: link.external_id.clone(),
                found: found.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn decide(
        &self,
        entry: &FieldMappingEntry,
        existing: &TaskRecord,
        candidate: &TaskCandidate,
        baseline: Option<&TaskCandidate>,
    ) -> FieldDecision {
        let field = entry.internal_field;

        if entry.preserve_local_value {
            return FieldDecision::KeptLocal {
                reason: KeepReason::LocalOnly,
            };
        }

        let external = match candidate.get(field) {
            Some(CandidateValue::Value(v)) => v,
            Some(CandidateValue::Failed(e)) => return mapping_failed(&existing.id, e.clone()),
            Some(CandidateValue::Absent) | None => {
                return FieldDecision::KeptLocal {
                    reason: KeepReason::NotInPayload,
                };
            }
        };

        let local = existing.get(field);
        if local == *external {
            return FieldDecision::Unchanged;
        }

        if let Some(last) = baseline.and_then(|b| b.value(field)) {
            let local_changed = local != *last;
            let external_changed = external != last;

            if local_changed && !external_changed {
                return FieldDecision::KeptLocal {
                    reason: KeepReason::LocalEdit,
                };
            }

            if local_changed && external_changed {
                return self.conflict(&existing.id, field, local, external.clone());
            }
        }

        adopt(entry, external.clone())
    }

    fn conflict(
        &self,
        task_id: &str,
        field: TaskField,
        local: FieldValue,
        external: FieldValue,
    ) -> FieldDecision {
        let resolution = self.policy.resolution_for(field, self.mapper);
        debug!(
            task = %task_id,
            %field,
            %local,
            %external,
            "Both sides changed since last sync, {}",
            resolution
        );
        FieldDecision::Conflict {
            local,
            external,
            resolution,
        }
    }
}

fn adopt(entry: &FieldMappingEntry, value: FieldValue) -> FieldDecision {
    if entry.to_internal.is_some() {
        FieldDecision::Transformed { value }
    } else {
        FieldDecision::AdoptedExternal { value }
    }
}

fn adopted_value(decision: &FieldDecision) -> Option<&FieldValue> {
    match decision {
        FieldDecision::AdoptedExternal { value } | FieldDecision::Transformed { value } => {
            Some(value)
        }
        FieldDecision::Conflict {
            external,
            resolution: ConflictResolution::ExternalWins,
            ..
        } => Some(external),
        _ => None,
    }
}

fn mapping_failed(task_id: &str, error: MappingError) -> FieldDecision {
    warn!(task = %task_id, "Keeping local value: {}", error);
    FieldDecision::MappingFailed { error }
}

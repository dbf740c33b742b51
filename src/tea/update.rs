//! Update function for TEA pattern
//!
//! Every state change of the view session happens here. Submissions read the
//! current form, remote completions write exactly one slot.

use crate::api::{build_broadcast_request, build_code_search_query};
use crate::tea::command::RemoteCommand;
use crate::tea::message::{ArchiveMessage, BroadcastMessage, CodesMessage, FormMessage, SystemMessage};
use crate::tea::{Command, Message, Model, UpdateResult};

/// Main update function that processes messages and returns updated model with commands
pub fn update(model: Model, message: Message) -> UpdateResult<Model> {
    match message {
        Message::System(msg) => update_system(model, msg),
        Message::Form(msg) => update_form(model, msg),
        Message::Broadcast(msg) => update_broadcast(model, msg),
        Message::Codes(msg) => update_codes(model, msg),
        Message::Archive(msg) => update_archive(model, msg),
    }
}

/// Handle lifecycle messages
fn update_system(mut model: Model, message: SystemMessage) -> UpdateResult<Model> {
    match message {
        SystemMessage::Initialize => {
            if model.session.initialized || !model.session.live {
                return UpdateResult::just_model(model);
            }

            model.session.initialized = true;
            tracing::info!("Session initialized against {}", model.config.origin());

            UpdateResult::with_command(
                model,
                Command::message(Message::Archive(ArchiveMessage::Load)),
            )
        }

        SystemMessage::Shutdown => {
            model.session.live = false;
            tracing::debug!("Session shut down");
            UpdateResult::just_model(model)
        }
    }
}

/// Handle form edits
fn update_form(mut model: Model, message: FormMessage) -> UpdateResult<Model> {
    let form = &mut model.form;
    match message {
        FormMessage::IntentionChanged(text) => form.intention = text,
        FormMessage::FrequencyChanged(text) => form.frequency_text = text,
        FormMessage::FieldTypeSelected(field_type) => form.field_type = field_type,
        FormMessage::AmplifyToggled(amplify) => form.amplify = amplify,
        FormMessage::MultiplierChanged(text) => form.multiplier_text = text,
        FormMessage::CodeQueryChanged(text) => form.code_query = text,
    }

    UpdateResult::just_model(model)
}

/// Handle broadcast submission and completion
fn update_broadcast(mut model: Model, message: BroadcastMessage) -> UpdateResult<Model> {
    let drop_stale = model.config.drop_stale_responses;

    match message {
        BroadcastMessage::Submit => {
            if !model.session.live {
                return UpdateResult::just_model(model);
            }

            let form = &model.form;
            let request = build_broadcast_request(
                &form.intention,
                &form.frequency_text,
                form.field_type,
                form.amplify,
                &form.multiplier_text,
            );
            let seq = model.latest_broadcast.issue();

            UpdateResult::with_command(model, Command::remote(RemoteCommand::Broadcast { seq, request }))
        }

        BroadcastMessage::Completed(seq, response) => {
            if !model.session.live {
                tracing::debug!("Ignoring broadcast {} after shutdown", seq);
                model.latest_broadcast.discard(seq);
            } else if model.latest_broadcast.accept(seq, response, drop_stale) {
                tracing::info!("Broadcast {} stored", seq);
            } else {
                tracing::debug!("Dropped stale broadcast {}", seq);
            }
            UpdateResult::just_model(model)
        }

        BroadcastMessage::Failed(seq, error) => {
            if !model.session.live {
                model.latest_broadcast.discard(seq);
            } else {
                model.latest_broadcast.record_failure(seq, error, drop_stale);
            }
            UpdateResult::just_model(model)
        }
    }
}

/// Handle healing code searches
fn update_codes(mut model: Model, message: CodesMessage) -> UpdateResult<Model> {
    let drop_stale = model.config.drop_stale_responses;

    match message {
        CodesMessage::Search => {
            if !model.session.live {
                return UpdateResult::just_model(model);
            }

            let query = build_code_search_query(&model.form.code_query);
            let seq = model.code_search_results.issue();

            UpdateResult::with_command(model, Command::remote(RemoteCommand::SearchCodes { seq, query }))
        }

        CodesMessage::Completed(seq, codes) => {
            if !model.session.live {
                tracing::debug!("Ignoring code search {} after shutdown", seq);
                model.code_search_results.discard(seq);
            } else {
                let count = codes.len();
                if model.code_search_results.accept(seq, codes, drop_stale) {
                    tracing::info!("Code search {} returned {} codes", seq, count);
                } else {
                    tracing::debug!("Dropped stale code search {}", seq);
                }
            }
            UpdateResult::just_model(model)
        }

        CodesMessage::Failed(seq, error) => {
            if !model.session.live {
                model.code_search_results.discard(seq);
            } else {
                model.code_search_results.record_failure(seq, error, drop_stale);
            }
            UpdateResult::just_model(model)
        }
    }
}

/// Handle soul archive loading
fn update_archive(mut model: Model, message: ArchiveMessage) -> UpdateResult<Model> {
    let drop_stale = model.config.drop_stale_responses;

    match message {
        ArchiveMessage::Load => {
            if !model.session.live {
                return UpdateResult::just_model(model);
            }

            let seq = model.archive_entries.issue();
            UpdateResult::with_command(model, Command::remote(RemoteCommand::LoadArchives { seq }))
        }

        ArchiveMessage::Loaded(seq, entries) => {
            if !model.session.live {
                tracing::debug!("Ignoring archive load {} after shutdown", seq);
                model.archive_entries.discard(seq);
            } else {
                let count = entries.len();
                if model.archive_entries.accept(seq, entries, drop_stale) {
                    tracing::info!("Archive load {} returned {} entries", seq, count);
                } else {
                    tracing::debug!("Dropped stale archive load {}", seq);
                }
            }
            UpdateResult::just_model(model)
        }

        ArchiveMessage::Failed(seq, error) => {
            if !model.session.live {
                model.archive_entries.discard(seq);
            } else {
                model.archive_entries.record_failure(seq, error, drop_stale);
            }
            UpdateResult::just_model(model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FieldType, HealingCode, SoulArchiveEntry};
    use crate::error::ApiError;
    use crate::tea::model::RequestSeq;

    fn remote_of(result: &UpdateResult<Model>) -> &RemoteCommand {
        match result.commands.as_slice() {
            [Command::Remote(remote)] => remote,
            other => panic!("expected one remote command, got {:?}", other),
        }
    }

    fn archive(id: &str) -> SoulArchiveEntry {
        SoulArchiveEntry {
            id: id.to_string(),
            title: "First Light".to_string(),
            intention: "clarity".to_string(),
            pattern_type: "torus".to_string(),
            frequency: 7.83,
        }
    }

    #[test]
    fn test_initialize_requests_archive_load_once() {
        let result = update(Model::default(), SystemMessage::Initialize.into());
        assert!(matches!(
            result.commands.as_slice(),
            [Command::SendMessage(Message::Archive(ArchiveMessage::Load))]
        ));

        let again = update(result.model, SystemMessage::Initialize.into());
        assert!(again.commands.is_empty());
    }

    #[test]
    fn test_form_edits() {
        let mut model = Model::default();
        for msg in [
            FormMessage::IntentionChanged("I am at peace".to_string()),
            FormMessage::FrequencyChanged("432".to_string()),
            FormMessage::FieldTypeSelected(FieldType::SriYantra),
            FormMessage::AmplifyToggled(true),
            FormMessage::MultiplierChanged("3".to_string()),
            FormMessage::CodeQueryChanged("love".to_string()),
        ] {
            let result = update(model, msg.into());
            assert!(result.commands.is_empty());
            model = result.model;
        }

        assert_eq!(model.form.intention, "I am at peace");
        assert_eq!(model.form.frequency_text, "432");
        assert_eq!(model.form.field_type, FieldType::SriYantra);
        assert!(model.form.amplify);
        assert_eq!(model.form.multiplier_text, "3");
        assert_eq!(model.form.code_query, "love");
    }

    #[test]
    fn test_submit_builds_request_from_form() {
        let mut model = Model::default();
        model.form.intention = "healing".to_string();
        model.form.frequency_text = "abc".to_string();
        model.form.field_type = FieldType::Merkaba;
        let form_before = model.form.clone();

        let result = update(model, BroadcastMessage::Submit.into());
        match remote_of(&result) {
            RemoteCommand::Broadcast { seq, request } => {
                assert_eq!(*seq, RequestSeq(1));
                assert_eq!(request.intention, "healing");
                assert!(request.frequency.is_nan());
                assert_eq!(request.field_type, FieldType::Merkaba);
                assert_eq!(request.multiplier, 1.0);
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert_eq!(result.model.form, form_before);
        assert!(result.model.latest_broadcast.is_pending());
    }

    #[test]
    fn test_search_uses_code_query() {
        let mut model = Model::default();
        model.form.code_query = "confidence".to_string();

        let result = update(model, CodesMessage::Search.into());
        match remote_of(&result) {
            RemoteCommand::SearchCodes { query, .. } => assert_eq!(query, "confidence"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_archive_loaded_replaces_entries() {
        let result = update(Model::default(), ArchiveMessage::Load.into());
        let seq = match remote_of(&result) {
            RemoteCommand::LoadArchives { seq } => *seq,
            other => panic!("unexpected command {:?}", other),
        };

        let result = update(result.model, ArchiveMessage::Loaded(seq, vec![archive("1")]).into());
        assert_eq!(result.model.archives(), &[archive("1")]);
        assert!(!result.model.has_pending());
    }

    #[test]
    fn test_stale_search_dropped() {
        let model = update(Model::default(), CodesMessage::Search.into()).model;
        let model = update(model, CodesMessage::Search.into()).model;

        let newer = vec![HealingCode {
            code: "2".to_string(),
            description: "newer".to_string(),
            category: "c".to_string(),
            affirmation: None,
        }];
        let older = vec![HealingCode {
            code: "1".to_string(),
            description: "older".to_string(),
            category: "c".to_string(),
            affirmation: None,
        }];

        let model = update(model, CodesMessage::Completed(RequestSeq(2), newer.clone()).into()).model;
        let model = update(model, CodesMessage::Completed(RequestSeq(1), older).into()).model;
        assert_eq!(model.healing_codes(), newer.as_slice());
    }

    #[test]
    fn test_failure_leaves_previous_value() {
        let model = update(Model::default(), ArchiveMessage::Load.into()).model;
        let model = update(model, ArchiveMessage::Loaded(RequestSeq(1), vec![archive("1")]).into()).model;
        let model = update(model, ArchiveMessage::Load.into()).model;
        let model = update(
            model,
            ArchiveMessage::Failed(RequestSeq(2), ApiError::transport("unreachable")).into(),
        )
        .model;

        assert_eq!(model.archives(), &[archive("1")]);
        assert!(model.archive_entries.last_error().is_some());
    }

    #[test]
    fn test_completion_after_shutdown_ignored() {
        let model = update(Model::default(), ArchiveMessage::Load.into()).model;
        let model = update(model, SystemMessage::Shutdown.into()).model;
        let model = update(model, ArchiveMessage::Loaded(RequestSeq(1), vec![archive("1")]).into()).model;

        assert!(model.archives().is_empty());
        assert!(!model.has_pending());

        let result = update(model, BroadcastMessage::Submit.into());
        assert!(result.commands.is_empty());
    }
}

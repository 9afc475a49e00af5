use std::sync::Arc;

use chat_provider::{
    CancelSignal, ChatProvider, GenerateEvent, GenerateRequest, ProviderProfile, TokenUsage,
};
use sigma::app::Mode;
use sigma::controller::{ConversationController, TurnError};

mod support;
use support::{RecordingView, ViewEvent};

fn contract_profile() -> ProviderProfile {
    ProviderProfile {
        provider_id: "contract-test".to_string(),
        model_id: "contract-model".to_string(),
    }
}

fn controller_with(provider: impl ChatProvider) -> ConversationController {
    ConversationController::new(
        Arc::new(provider),
        None,
        "contract-session",
        "Keep me reflecting.",
        "Hello!",
        None,
    )
    .expect("controller should construct")
}

struct LifecycleProvider;

impl ChatProvider for LifecycleProvider {
    fn profile(&self) -> ProviderProfile {
        contract_profile()
    }

    fn generate(
        &self,
        req: GenerateRequest,
        _cancel: CancelSignal,
        emit: &mut dyn FnMut(GenerateEvent),
    ) -> Result<(), String> {
        emit(GenerateEvent::Started {
            generation_id: req.generation_id,
        });
        emit(GenerateEvent::Chunk {
            generation_id: req.generation_id,
            text: "hello ".to_string(),
        });
        emit(GenerateEvent::Chunk {
            generation_id: req.generation_id,
            text: "world".to_string(),
        });
        emit(GenerateEvent::Finished {
            generation_id: req.generation_id,
            usage: Some(TokenUsage {
                prompt_tokens: 4,
                completion_tokens: 2,
            }),
        });
        Ok(())
    }
}

/// Emits chunks but never a terminal event, then returns success.
struct NoTerminalProvider;

impl ChatProvider for NoTerminalProvider {
    fn profile(&self) -> ProviderProfile {
        contract_profile()
    }

    fn generate(
        &self,
        req: GenerateRequest,
        _cancel: CancelSignal,
        emit: &mut dyn FnMut(GenerateEvent),
    ) -> Result<(), String> {
        emit(GenerateEvent::Started {
            generation_id: req.generation_id,
        });
        emit(GenerateEvent::Chunk {
            generation_id: req.generation_id,
            text: "half-finished".to_string(),
        });
        Ok(())
    }
}

/// Fails at the trait boundary without emitting any terminal event.
struct ErrReturningProvider;

impl ChatProvider for ErrReturningProvider {
    fn profile(&self) -> ProviderProfile {
        contract_profile()
    }

    fn generate(
        &self,
        req: GenerateRequest,
        _cancel: CancelSignal,
        emit: &mut dyn FnMut(GenerateEvent),
    ) -> Result<(), String> {
        emit(GenerateEvent::Started {
            generation_id: req.generation_id,
        });
        Err("transport exploded".to_string())
    }
}

/// Records the context each call receives, then finishes with one chunk.
struct ContextCapturingProvider {
    seen: std::sync::Mutex<Vec<Vec<String>>>,
}

impl ChatProvider for ContextCapturingProvider {
    fn profile(&self) -> ProviderProfile {
        contract_profile()
    }

    fn generate(
        &self,
        req: GenerateRequest,
        _cancel: CancelSignal,
        emit: &mut dyn FnMut(GenerateEvent),
    ) -> Result<(), String> {
        self.seen.lock().expect("context log lock").push(
            req.messages
                .iter()
                .map(|message| format!("{}:{}", message.role(), message.text()))
                .collect(),
        );

        emit(GenerateEvent::Started {
            generation_id: req.generation_id,
        });
        emit(GenerateEvent::Chunk {
            generation_id: req.generation_id,
            text: "noted".to_string(),
        });
        emit(GenerateEvent::Finished {
            generation_id: req.generation_id,
            usage: None,
        });
        Ok(())
    }
}

#[test]
fn view_protocol_is_pending_then_chunks_then_complete() {
    let mut controller = controller_with(LifecycleProvider);
    let mut view = RecordingView::new();

    let reply = controller
        .submit("hi", &mut view)
        .expect("lifecycle turn should complete");

    assert_eq!(reply, "hello world");
    assert_eq!(
        view.events,
        vec![
            ViewEvent::Pending,
            ViewEvent::Chunk("hello ".to_string()),
            ViewEvent::Chunk("world".to_string()),
            ViewEvent::Complete,
        ]
    );
}

#[test]
fn missing_terminal_event_is_treated_as_a_failed_turn() {
    let mut controller = controller_with(NoTerminalProvider);
    let mut view = RecordingView::new();

    let error = controller
        .submit("hi", &mut view)
        .expect_err("missing terminal must fail the turn");

    assert!(matches!(
        error,
        TurnError::Generation(ref message) if message.contains("terminal")
    ));
    assert_eq!(controller.chat().mode, Mode::Idle);
    assert_eq!(controller.chat().session().turns.len(), 3);
}

#[test]
fn provider_error_return_is_surfaced_to_the_caller() {
    let mut controller = controller_with(ErrReturningProvider);
    let mut view = RecordingView::new();

    let error = controller
        .submit("hi", &mut view)
        .expect_err("provider error must fail the turn");

    assert!(matches!(
        error,
        TurnError::Generation(ref message) if message.contains("transport exploded")
    ));
    assert!(matches!(
        view.events.last(),
        Some(ViewEvent::Failed(message)) if message.contains("transport exploded")
    ));
}

#[test]
fn every_call_receives_the_full_ordered_history() {
    let provider = Arc::new(ContextCapturingProvider {
        seen: std::sync::Mutex::new(Vec::new()),
    });
    let mut controller = ConversationController::new(
        Arc::clone(&provider) as Arc<dyn ChatProvider>,
        None,
        "contract-session",
        "Keep me reflecting.",
        "Hello!",
        None,
    )
    .expect("controller should construct");

    let mut view = RecordingView::new();
    controller.submit("first", &mut view).expect("turn one");
    controller.submit("second", &mut view).expect("turn two");

    let seen = provider.seen.lock().expect("context log lock");
    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[0],
        vec![
            "system:Keep me reflecting.".to_string(),
            "assistant:Hello!".to_string(),
            "user:first".to_string(),
        ]
    );
    assert_eq!(
        seen[1],
        vec![
            "system:Keep me reflecting.".to_string(),
            "assistant:Hello!".to_string(),
            "user:first".to_string(),
            "assistant:noted".to_string(),
            "user:second".to_string(),
        ]
    );
}

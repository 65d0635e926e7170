//! Dispatcher integration tests against scripted providers.

use helpdesk_rs_config::{DispatchConfig, ModelsConfig};
use helpdesk_rs_core::dispatch::{
    NO_IMAGE, NO_RESPONSE, RESEARCH_NEEDS_QUESTION, TRANSCRIBE_NEEDS_AUDIO, TRANSCRIBE_PROMPT,
};
use helpdesk_rs_core::{
    CancellationToken, Dispatcher, ToolCatalog, TurnOutcome, TurnRequest, TurnResult,
};
use helpdesk_rs_protocol::{
    AspectRatio, Attachment, ContentResponse, GenerativeProvider, GroundingSource, InlineData,
    Modality, Part, ProviderError, VideoOperation,
};
use helpdesk_rs_test_utils::{FailingProvider, ProviderCall, ScriptedProvider};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn request(tool: &str, text: &str, attachment: Option<Attachment>) -> TurnRequest {
    let catalog = ToolCatalog::builtin();
    let tool = catalog.find_tool(tool).expect("tool").clone();
    TurnRequest {
        aspect_ratio: tool.default_aspect_ratio,
        tool,
        text: text.to_string(),
        attachment,
    }
}

fn dispatcher(provider: Arc<dyn GenerativeProvider>) -> Dispatcher {
    Dispatcher::new(provider, ModelsConfig::default(), DispatchConfig::default())
}

fn completed(outcome: TurnOutcome) -> TurnResult {
    match outcome {
        TurnOutcome::Completed(result) => result,
        other => panic!("expected completed outcome, got {other:?}"),
    }
}

/// Default-branch tools send the tool instruction verbatim with the default text model.
#[tokio::test]
async fn text_tool_sends_instruction_and_attachment_first() {
    let provider = Arc::new(ScriptedProvider::new().with_text("Traducción lista"));
    let dispatcher = dispatcher(provider.clone());
    let pdf = Attachment::from_bytes("brief.pdf", "application/pdf", b"%PDF-1.7");
    let turn = request("translator", "Translate to Spanish", Some(pdf.clone()));
    let instruction = turn.tool.instruction.clone();

    let result = completed(dispatcher.dispatch(turn, &CancellationToken::new()).await);
    assert_eq!(result.text, "Traducción lista");

    let sent = provider.content_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].model, "gemini-2.5-flash");
    assert_eq!(sent[0].system_instruction.as_deref(), Some(instruction.as_str()));
    assert_eq!(
        sent[0].parts,
        vec![
            Part::Inline(pdf.inline),
            Part::Text("Translate to Spanish".to_string()),
        ]
    );
    assert!(!sent[0].google_search);
    assert_eq!(sent[0].thinking_budget, None);
}

/// Empty model text is replaced with a fixed notice.
#[tokio::test]
async fn empty_text_becomes_no_response_notice() {
    let provider = Arc::new(ScriptedProvider::new().with_text("   "));
    let result = completed(
        dispatcher(provider)
            .dispatch(request("newsletter", "Spring update", None), &CancellationToken::new())
            .await,
    );
    assert_eq!(result.text, NO_RESPONSE);
}

/// Strategy adds the thinking budget and honours its model override.
#[tokio::test]
async fn strategy_tool_uses_thinking_budget() {
    let provider = Arc::new(ScriptedProvider::new().with_text("Plan"));
    let _ = dispatcher(provider.clone())
        .dispatch(request("strategy", "Should we expand?", None), &CancellationToken::new())
        .await;
    let sent = provider.content_requests();
    assert_eq!(sent[0].thinking_budget, Some(32_768));
    assert_eq!(sent[0].model, "gemini-2.5-pro");
}

/// Research enables grounding and lists each source URI once.
#[tokio::test]
async fn research_appends_deduplicated_sources() {
    let response = ContentResponse {
        parts: vec![Part::Text("Malaria cases fell in 2023.".to_string())],
        sources: vec![
            GroundingSource {
                title: "WHO".to_string(),
                uri: "https://who.int/report".to_string(),
            },
            GroundingSource {
                title: "WHO (mirror)".to_string(),
                uri: "https://who.int/report".to_string(),
            },
            GroundingSource {
                title: "UNICEF".to_string(),
                uri: "https://unicef.org/data".to_string(),
            },
        ],
    };
    let provider = Arc::new(ScriptedProvider::new().with_content(Ok(response)));
    let result = completed(
        dispatcher(provider.clone())
            .dispatch(request("research", "Malaria trends", None), &CancellationToken::new())
            .await,
    );
    assert_eq!(
        result.text,
        "Malaria cases fell in 2023.\n\n**Sources:**\n- [WHO](https://who.int/report)\n- [UNICEF](https://unicef.org/data)"
    );
    let sent = provider.content_requests();
    assert!(sent[0].google_search);
    assert_eq!(sent[0].parts, vec![Part::Text("Malaria trends".to_string())]);
}

/// Research needs a question; an attachment alone is rejected without a call.
#[tokio::test]
async fn research_without_question_is_rejected() {
    let provider = Arc::new(ScriptedProvider::new());
    let dispatcher = dispatcher(provider.clone());
    let pdf = Attachment::from_bytes("survey.pdf", "application/pdf", b"%PDF-1.7");
    let outcome = dispatcher
        .dispatch(request("research", "", Some(pdf)), &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Rejected(RESEARCH_NEEDS_QUESTION.to_string()));

    let outcome = dispatcher
        .dispatch(request("research", "   ", None), &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Rejected(RESEARCH_NEEDS_QUESTION.to_string()));
    assert_eq!(provider.call_count(), 0);
}

/// Transcription without audio is rejected before any provider call.
#[tokio::test]
async fn transcribe_without_audio_is_rejected() {
    let provider = Arc::new(ScriptedProvider::new());
    let dispatcher = dispatcher(provider.clone());
    let outcome = dispatcher
        .dispatch(request("transcribe", "please", None), &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Rejected(TRANSCRIBE_NEEDS_AUDIO.to_string()));

    let image = Attachment::from_bytes("photo.png", "image/png", b"png");
    let outcome = dispatcher
        .dispatch(request("transcribe", "", Some(image)), &CancellationToken::new())
        .await;
    assert_eq!(outcome, TurnOutcome::Rejected(TRANSCRIBE_NEEDS_AUDIO.to_string()));
    assert_eq!(provider.call_count(), 0);
}

/// Transcription sends the audio, the fixed prompt, then the user's note.
#[tokio::test]
async fn transcribe_sends_audio_then_prompt() {
    let provider = Arc::new(ScriptedProvider::new().with_text("Hello everyone."));
    let audio = Attachment::from_bytes("memo.wav", "audio/wav", b"RIFF");
    let result = completed(
        dispatcher(provider.clone())
            .dispatch(
                request("transcribe", "two speakers", Some(audio.clone())),
                &CancellationToken::new(),
            )
            .await,
    );
    assert_eq!(result.text, "Hello everyone.");
    let sent = provider.content_requests();
    assert_eq!(
        sent[0].parts,
        vec![
            Part::Inline(audio.inline),
            Part::Text(TRANSCRIBE_PROMPT.to_string()),
            Part::Text("Note from the user: two speakers".to_string()),
        ]
    );
}

/// Without an image attachment the image tool calls the text-to-image model.
#[tokio::test]
async fn image_tool_generates_with_chosen_aspect_ratio() {
    let png = InlineData::from_bytes("image/png", b"generated");
    let provider = Arc::new(ScriptedProvider::new().with_images(Ok(vec![png.clone()])));
    let mut turn = request("visual", "A food drive poster", None);
    turn.aspect_ratio = AspectRatio::Tall;

    let result = completed(
        dispatcher(provider.clone())
            .dispatch(turn, &CancellationToken::new())
            .await,
    );
    assert_eq!(result.image, Some(png.data_uri()));

    match &provider.calls()[0] {
        ProviderCall::Images(sent) => {
            assert_eq!(sent.model, "imagen-4.0-generate-001");
            assert_eq!(sent.aspect_ratio, AspectRatio::Tall);
            assert!(sent.prompt.ends_with("A food drive poster"));
            assert_eq!(sent.number_of_images, 1);
        }
        other => panic!("unexpected call {other:?}"),
    }
}

/// No generated image is a soft failure, not an error.
#[tokio::test]
async fn image_tool_reports_missing_image() {
    let provider = Arc::new(ScriptedProvider::new().with_images(Ok(Vec::new())));
    let result = completed(
        dispatcher(provider)
            .dispatch(request("visual", "A tree", None), &CancellationToken::new())
            .await,
    );
    assert_eq!(result.text, NO_IMAGE);
    assert_eq!(result.image, None);
}

/// An attached image switches the image tool to the edit model.
#[tokio::test]
async fn image_tool_edits_attached_image() {
    let edited = InlineData::from_bytes("image/png", b"edited");
    let provider = Arc::new(ScriptedProvider::new().with_content(Ok(ContentResponse {
        parts: vec![
            Part::Text("Added a border.".to_string()),
            Part::Inline(edited.clone()),
        ],
        sources: Vec::new(),
    })));
    let photo = Attachment::from_bytes("cert.jpg", "image/jpeg", b"jpg");
    let result = completed(
        dispatcher(provider.clone())
            .dispatch(
                request("certificate-design", "Add a gold border", Some(photo.clone())),
                &CancellationToken::new(),
            )
            .await,
    );
    assert_eq!(result.text, "Added a border.");
    assert_eq!(result.image, Some(edited.data_uri()));

    let sent = provider.content_requests();
    assert_eq!(sent[0].model, "gemini-2.5-flash-image");
    assert_eq!(
        sent[0].response_modalities,
        vec![Modality::Image, Modality::Text]
    );
    assert_eq!(sent[0].parts[0], Part::Inline(photo.inline));
}

/// Provider errors become a single "Error: ..." outcome.
#[tokio::test]
async fn provider_failures_are_contained() {
    let provider = Arc::new(FailingProvider::new(ProviderError::Api {
        status: 429,
        message: "quota exhausted".to_string(),
    }));
    let outcome = dispatcher(provider.clone())
        .dispatch(request("grant-writer", "Draft a summary", None), &CancellationToken::new())
        .await;
    assert_eq!(
        outcome,
        TurnOutcome::Failed("Error: provider returned 429: quota exhausted".to_string())
    );
    assert_eq!(provider.call_count(), 1);
}

/// Video polling continues on the configured interval until the job is done.
#[tokio::test(start_paused = true)]
async fn video_polls_until_done() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_video_start(Ok(VideoOperation::running("operations/v1")))
            .with_video_poll(Ok(VideoOperation::running("operations/v1")))
            .with_video_poll(Ok(VideoOperation::running("operations/v1")))
            .with_video_poll(Ok(VideoOperation::completed(
                "operations/v1",
                "https://files.example/v1.mp4",
            ))),
    );
    let seed = Attachment::from_bytes("seed.png", "image/png", b"seed");
    let started = tokio::time::Instant::now();
    let result = completed(
        dispatcher(provider.clone())
            .dispatch(
                request("video", "Volunteers planting trees", Some(seed.clone())),
                &CancellationToken::new(),
            )
            .await,
    );
    assert_eq!(result.video.as_deref(), Some("https://files.example/v1.mp4"));
    assert!(started.elapsed() >= Duration::from_secs(15));

    let calls = provider.calls();
    assert_eq!(calls.len(), 4);
    match &calls[0] {
        ProviderCall::StartVideo(sent) => {
            assert_eq!(sent.model, "veo-3.1-fast-generate-preview");
            assert_eq!(sent.resolution, "720p");
            assert_eq!(sent.aspect_ratio, AspectRatio::Wide);
            assert_eq!(sent.seed_image, Some(seed.inline));
        }
        other => panic!("unexpected call {other:?}"),
    }
    assert_eq!(calls[3], ProviderCall::PollVideo("operations/v1".to_string()));
}

/// Video polling gives up once the configured deadline would be exceeded.
#[tokio::test(start_paused = true)]
async fn video_polling_times_out() {
    let provider = Arc::new(ScriptedProvider::new());
    let settings = DispatchConfig {
        video_poll_interval_secs: 5,
        video_max_wait_secs: 12,
        ..DispatchConfig::default()
    };
    let dispatcher = Dispatcher::new(provider.clone(), ModelsConfig::default(), settings);
    let outcome = dispatcher
        .dispatch(request("video", "A clip", None), &CancellationToken::new())
        .await;
    assert_eq!(
        outcome,
        TurnOutcome::Failed("Error: video generation timed out after 12s".to_string())
    );
    // One start plus two polls at 5s and 10s.
    assert_eq!(provider.call_count(), 3);
}

/// A zero poll interval from an unvalidated config still waits between polls.
#[tokio::test(start_paused = true)]
async fn zero_poll_interval_is_floored_to_one_second() {
    let provider = Arc::new(ScriptedProvider::new());
    let settings = DispatchConfig {
        video_poll_interval_secs: 0,
        video_max_wait_secs: 3,
        ..DispatchConfig::default()
    };
    let dispatcher = Dispatcher::new(provider.clone(), ModelsConfig::default(), settings);
    let outcome = dispatcher
        .dispatch(request("video", "A clip", None), &CancellationToken::new())
        .await;
    assert_eq!(
        outcome,
        TurnOutcome::Failed("Error: video generation timed out after 3s".to_string())
    );
    // One start plus polls at 1s, 2s and 3s.
    assert_eq!(provider.call_count(), 4);
}

/// A job that finishes with an error fails the turn.
#[tokio::test(start_paused = true)]
async fn video_operation_error_fails_the_turn() {
    let provider = Arc::new(ScriptedProvider::new().with_video_poll(Ok(VideoOperation {
        name: "operations/scripted".to_string(),
        done: true,
        video_uri: None,
        error: Some("safety filter triggered".to_string()),
    })));
    let outcome = dispatcher(provider)
        .dispatch(request("video", "A clip", None), &CancellationToken::new())
        .await;
    assert_eq!(
        outcome,
        TurnOutcome::Failed("Error: safety filter triggered".to_string())
    );
}

/// Cancelling the token abandons a slow request.
#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_in_flight_request() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_delay(Duration::from_secs(60))
            .with_text("too late"),
    );
    let dispatcher = dispatcher(provider);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let handle = tokio::spawn(async move {
        dispatcher
            .dispatch(request("email-writer", "Thank the mayor", None), &cancel)
            .await
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    trigger.cancel();
    assert_eq!(handle.await.expect("join"), TurnOutcome::Cancelled);
}

/// A token cancelled up front short-circuits without provider calls.
#[tokio::test]
async fn pre_cancelled_turns_skip_the_provider() {
    let provider = Arc::new(ScriptedProvider::new());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = dispatcher(provider.clone())
        .dispatch(request("email-writer", "hi", None), &cancel)
        .await;
    assert_eq!(outcome, TurnOutcome::Cancelled);
    assert_eq!(provider.call_count(), 0);
}

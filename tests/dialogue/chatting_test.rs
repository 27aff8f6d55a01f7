//! Chatting stage: gates, provider turns, history, fallbacks.

use chrono::TimeDelta;

use pogovorim::dialogue::texts;
use pogovorim::profile::{HistoryEntry, HistoryRole, Plan, Profile, Stage, HISTORY_LIMIT};
use pogovorim::providers::{ProviderError, Role};

use crate::support::{Harness, ALICE, TRIAL_END, TRIAL_SECS};

const PERSONA: &str = "persona under test";

fn chatting(user_name: Option<&str>) -> Profile {
    Profile {
        stage: Stage::Chatting,
        user_name: user_name.map(str::to_owned),
        persona_prompt: Some(PERSONA.to_owned()),
        trial_until: Some(TRIAL_END),
        ..Profile::default()
    }
}

#[tokio::test]
async fn provider_turn_records_history_and_prefixes_name() {
    let h = Harness::new([]);
    h.seed(ALICE, &chatting(Some("Оля"))).await;
    h.provider.push_text("Отлично, а у тебя?");

    let reply = h.say(ALICE, "как дела?").await;
    assert_eq!(reply, "Оля, Отлично, а у тебя?");

    let requests = h.provider.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.system.as_deref(), Some(PERSONA));
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].role, Role::User);
    assert_eq!(request.messages[0].content, "как дела?");
    assert_eq!(request.max_tokens, Some(600));
    assert_eq!(request.temperature, Some(0.7));

    let profile = h.profile(ALICE).await;
    assert_eq!(
        profile.history,
        vec![
            HistoryEntry::user("как дела?"),
            HistoryEntry::assistant("Отлично, а у тебя?"),
        ]
    );
}

#[tokio::test]
async fn answer_without_user_name_has_no_prefix() {
    let h = Harness::new([]);
    h.seed(ALICE, &chatting(None)).await;
    h.provider.push_text("Привет!");
    assert_eq!(h.say(ALICE, "привет").await, "Привет!");
}

#[tokio::test]
async fn provider_output_is_html_escaped() {
    let h = Harness::new([]);
    h.seed(ALICE, &chatting(None)).await;
    h.provider.push_text("1 < 2 & 3 > 2");
    assert_eq!(h.say(ALICE, "сравни").await, "1 &lt; 2 &amp; 3 &gt; 2");
    let profile = h.profile(ALICE).await;
    assert_eq!(profile.history[1].content, "1 < 2 & 3 > 2");
}

#[tokio::test]
async fn expired_trial_gets_paywall_without_provider_call() {
    let h = Harness::new([]);
    h.seed(ALICE, &chatting(Some("Оля"))).await;
    h.clock.advance(TimeDelta::seconds(TRIAL_SECS));

    let reply = h.say(ALICE, "привет").await;
    assert_eq!(reply, texts::PAYWALL);
    assert_eq!(h.provider.calls(), 0);
    assert!(h.profile(ALICE).await.history.is_empty());
}

#[tokio::test]
async fn paid_plan_ignores_expired_trial() {
    let h = Harness::new([]);
    let profile = Profile {
        plan: Plan::Paid,
        trial_until: Some(1),
        ..chatting(None)
    };
    h.seed(ALICE, &profile).await;
    h.provider.push_text("Рада тебя видеть");
    assert_eq!(h.say(ALICE, "привет").await, "Рада тебя видеть");
}

#[tokio::test]
async fn banned_topic_redirects_without_history() {
    let h = Harness::new([]);
    h.seed(ALICE, &chatting(None)).await;

    let reply = h.say(ALICE, "расскажи про наркотики").await;
    assert_eq!(reply, texts::SAFE_TOPIC);
    assert_eq!(h.provider.calls(), 0);
    let profile = h.profile(ALICE).await;
    assert!(profile.history.is_empty());
    assert_eq!(profile.stage, Stage::Chatting);
}

#[tokio::test]
async fn no_idea_gets_a_starter() {
    let h = Harness::new([2]);
    h.seed(ALICE, &chatting(None)).await;

    let reply = h.say(ALICE, "не знаю о чём").await;
    assert_eq!(reply, texts::STARTERS[2]);
    assert_eq!(h.provider.calls(), 0);
    assert!(h.profile(ALICE).await.history.is_empty());
}

#[tokio::test]
async fn insufficient_balance_is_reported_and_recorded() {
    let h = Harness::new([]);
    h.seed(ALICE, &chatting(None)).await;
    h.provider.push_error(ProviderError::Exhausted {
        message: "Insufficient Balance invalid_request_error".to_owned(),
    });

    let reply = h.say(ALICE, "привет").await;
    assert_eq!(reply, texts::PROVIDER_EXHAUSTED);

    let history = h.profile(ALICE).await.history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, HistoryRole::Assistant);
    assert_eq!(history[1].content, texts::PROVIDER_EXHAUSTED);
}

#[tokio::test]
async fn transport_failures_use_the_retry_message() {
    let h = Harness::new([]);
    h.seed(ALICE, &chatting(Some("Оля"))).await;
    // Empty script: the fake reports a malformed response.
    let reply = h.say(ALICE, "привет").await;
    assert_eq!(reply, format!("Оля, {}", texts::PROVIDER_HICCUP));
}

#[tokio::test]
async fn history_stays_bounded_and_ordered() {
    let h = Harness::new([]);
    h.seed(ALICE, &chatting(None)).await;

    for i in 0..10 {
        h.provider.push_text(&format!("ответ {i}"));
        let _ = h.say(ALICE, &format!("вопрос {i}")).await;
    }

    let history = h.profile(ALICE).await.history;
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history[0], HistoryEntry::user("вопрос 4"));
    assert_eq!(history[11], HistoryEntry::assistant("ответ 9"));

    let last_request = h.provider.requests().pop().expect("requests recorded");
    assert!(last_request.messages.len() <= HISTORY_LIMIT);
    assert_eq!(
        last_request.messages.last().map(|m| m.content.as_str()),
        Some("вопрос 9")
    );
}

#[tokio::test]
async fn missing_persona_is_rebuilt_before_the_call() {
    let h = Harness::new([1]);
    let profile = Profile {
        persona_prompt: None,
        ..chatting(None)
    };
    h.seed(ALICE, &profile).await;
    h.provider.push_text("ок");

    let _ = h.say(ALICE, "привет").await;
    let system = h.provider.requests()[0].system.clone().expect("system prompt");
    assert!(system.contains("имя Ника"));
    assert_eq!(
        h.profile(ALICE).await.persona_prompt.as_deref(),
        Some(system.as_str())
    );
}

#[tokio::test]
async fn concurrent_turns_for_one_participant_are_serialized() {
    let h = Harness::new([]);
    h.seed(ALICE, &chatting(None)).await;
    h.provider.push_text("первый");
    h.provider.push_text("второй");

    let first = {
        let dialogue = h.dialogue.clone();
        tokio::spawn(async move { dialogue.handle_text(ALICE, Some("раз")).await })
    };
    let second = {
        let dialogue = h.dialogue.clone();
        tokio::spawn(async move { dialogue.handle_text(ALICE, Some("два")).await })
    };
    first.await.expect("join").expect("turn");
    second.await.expect("join").expect("turn");

    let history = h.profile(ALICE).await.history;
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].role, HistoryRole::User);
    assert_eq!(history[1].role, HistoryRole::Assistant);
    assert_eq!(history[2].role, HistoryRole::User);
    assert_eq!(history[3].role, HistoryRole::Assistant);
}

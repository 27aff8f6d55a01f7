//! Canned replies.
//!
//! All replies are Telegram HTML. Anything that came from the participant
//! or the provider goes through [`escape_html`] before it is embedded.

use crate::profile::{Gender, Profile};

/// Escape special HTML characters in participant- or provider-supplied text.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Pick the masculine or feminine form according to the companion's gender.
pub fn gendered<'a>(profile: &Profile, masculine: &'a str, feminine: &'a str) -> &'a str {
    match profile.bot_gender {
        Some(Gender::Female) => feminine,
        _ => masculine,
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Reply to `start`.
pub const WELCOME: &str = "Привет 👋\n\
Я — твой душевный собеседник. Со мной можно поговорить обо всём:\n\
— просто пообщаться по душам, как с другом или подругой\n\
— обсудить умные и интересные темы\n\n\
✨ Я создан на основе искусственного интеллекта, но главное — я рядом и готов тебя поддержать.\n\n\
⚠️ Немного правил:\n\
• Общение доступно пользователям старше 13 лет\n\
• Платные функции — только от 18 лет\n\n\
Скажи, как тебе комфортнее — как с другом или как с подругой?";

/// Reply to `reset`.
pub const RESET: &str = "Ок, начнём заново. Нажми /start, и познакомимся ещё раз!";

/// Reply to `help`.
pub const HELP: &str = "Привет 👋 Я — твой душевный собеседник.\n\n\
Команды:\n\
/start — начать знакомство заново\n\
/reset — сбросить историю\n\
/profile — посмотреть профиль\n\
/help — эта подсказка\n\n\
Но в целом — просто пиши, и мы продолжим 🙂";

/// Reply to a command nobody handles.
pub fn unknown_command(command: &str) -> String {
    format!(
        "Не знаю команду /{}. Список команд: /help",
        escape_html(command)
    )
}

/// Reply when a turn could not be processed because the profile could not be stored.
pub const STORAGE_APOLOGY: &str =
    "Ой, у меня не получилось сохранить наш разговор. Попробуй написать ещё раз чуть позже 🙏";

/// Render the `profile` command.
pub fn profile_summary(profile: &Profile, trial_days_left: i64) -> String {
    const NONE: &str = "—";
    let user = profile
        .user_name
        .as_deref()
        .map_or_else(|| NONE.to_owned(), escape_html);
    let bot = profile
        .bot_name
        .as_deref()
        .map_or_else(|| NONE.to_owned(), escape_html);
    let gender = profile.bot_gender.map_or(NONE, |g| g.label());
    let age = profile
        .bot_age_category
        .as_ref()
        .map_or_else(|| NONE.to_owned(), |a| escape_html(a.label()));

    format!(
        "<b>Профиль:</b>\n\
         - ты: {user}\n\
         - я: {bot} ({gender}, {age})\n\
         - обращение: на «{addressing}»\n\
         - тариф: {plan} | дней пробного осталось: {trial_days_left}\n\
         Команды: /reset — начать заново, /help — подсказка",
        addressing = profile.addressing.pronoun(),
        plan = profile.plan.as_str(),
    )
}

// ---------------------------------------------------------------------------
// Greeting
// ---------------------------------------------------------------------------

/// Re-ask the friend/girlfriend question.
pub const ASK_COMPANION: &str =
    "Как тебе будет комфортнее: как с <b>другом</b> или как с <b>подругой</b>?";

/// Companion introduces itself under a freshly picked name.
pub fn introduction(gender: Gender, name: &str) -> String {
    let name = escape_html(name);
    match gender {
        Gender::Female => format!(
            "Хорошо 😊 Тогда я буду твоей подругой. Меня зовут <b>{name}</b>. Нравится это имя? \
             Если хочешь — предложи другое, и я с радостью переименуюсь."
        ),
        Gender::Male => format!(
            "Окей! Тогда я буду твоим другом. Меня зовут <b>{name}</b>. Как тебе такое имя? \
             Если есть вариант лучше — давай выберем!"
        ),
    }
}

// ---------------------------------------------------------------------------
// Naming the companion
// ---------------------------------------------------------------------------

/// Name kept; ask how to address the participant.
pub const NAME_KEPT: &str = "Отлично! Тогда оставим так. 😊 А как к тебе обращаться? \
Можно просто: «зови меня …». И подскажи, на <b>ты</b> или на <b>вы</b>?";

/// New name accepted; ask how to address the participant.
pub fn name_changed(name: &str) -> String {
    format!(
        "Красиво звучит. Пусть буду <b>{}</b> 🌟\n\
         Теперь расскажи, как к тебе обращаться? И на <b>ты</b> или на <b>вы</b>?",
        escape_html(name)
    )
}

/// Name rejected without an alternative.
pub const NAME_DECLINED: &str =
    "Понимаю 🙂 Хочешь, подберём другое имя? Можешь предложить своё одним словом.";

/// Could not tell whether the name was approved.
pub fn name_unclear(profile: &Profile) -> String {
    format!(
        "{} тебя. Давай уточним: оставить моё имя или предложишь другое? \
         Если всё ок — просто напиши «норм» или «подходит».",
        gendered(profile, "Понял", "Поняла")
    )
}

// ---------------------------------------------------------------------------
// Naming the participant
// ---------------------------------------------------------------------------

/// A political or banned topic was requested before introductions.
pub const TOPIC_REFUSED: &str = "С острыми политическими темами я не работаю — чтобы сохранять \
комфорт и уважение к разным взглядам. Могу предложить безопасные темы: планы, идеи, книги и фильмы, \
новости науки, саморазвитие 🙂\n\n\
Кстати, как к тебе обращаться? Можно написать: «зови меня …». И подскажи, на <b>ты</b> или на <b>вы</b>?";

/// A topic was requested before introductions.
pub const TOPIC_DEFERRED: &str = "Договорились, обсудим! Только давай сначала познакомимся 😊 \
Как к тебе обращаться? Напиши: «зови меня …». И подскажи, на <b>ты</b> или на <b>вы</b>?";

/// Introductions done; invite the first topic.
pub fn welcome(profile: &Profile, user_name: Option<&str>) -> String {
    let hello = match user_name {
        Some(name) => format!("Очень приятно познакомиться, {}! 😊 ", escape_html(name)),
        None => "Очень приятно познакомиться! 😊 ".to_owned(),
    };
    format!(
        "{hello}С чего начнём? Могу предложить: как прошёл твой день, что порадовало, планы и цели, \
         или обсудим какую-нибудь идею. Если не хочется думать — просто скажи «не знаю», {} предложу тему.",
        gendered(profile, "я сам", "я сама")
    )
}

// ---------------------------------------------------------------------------
// Chatting
// ---------------------------------------------------------------------------

/// Redirect away from a banned topic.
pub const SAFE_TOPIC: &str =
    "Предлагаю безопасную тему. Как прошёл твой день? Что сегодня было приятного? 🙂";

/// Trial over and no paid plan.
pub const PAYWALL: &str = "Похоже, пробный период закончился. Хочешь продолжить без ограничений? \
Напиши «Оплатить» — подскажу, как оформить подписку. (Пока заглушка)";

/// Conversation starters offered when the participant has no topic.
pub const STARTERS: &[&str] = &[
    "Давай начнём с простого: что тебя сегодня немного порадовало?",
    "Хочешь обсудим планы на вечер или неделю — что-то маленькое и конкретное?",
    "Расскажи про одну мелочь, за которую сегодня можно себя похвалить.",
];

/// Provider account ran out of balance.
pub const PROVIDER_EXHAUSTED: &str = "У меня техническая заминка: закончились ресурсы для генерации \
ответов. Я стану доступен снова, как только баланс будет пополнен. Спасибо за понимание! 🙏";

/// Provider reported some other error.
pub const PROVIDER_ERROR: &str =
    "У меня небольшая техническая заминка с генерацией ответа. Давай попробуем ещё раз?";

/// Provider could not be reached or answered garbage.
pub const PROVIDER_HICCUP: &str = "Кажется, у меня минутка заминки 😅 Давай попробуем ещё раз?";

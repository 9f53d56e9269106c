use std::sync::Arc;

use dotenv::dotenv;
use excel_interview_bot::{
    config::Config,
    error::InterviewError,
    leaderboard::LeaderboardStore,
    quiz::{
        generator::ChatGptGenerator,
        interview::{Interview, SourceSetup, Stage, MAX_QUESTIONS, MIN_QUESTIONS},
        pool::FallbackPool,
        report::summarize,
        source::QuestionSource,
    },
    render::{render_leaderboard, render_question, render_report, LEADERBOARD_ROWS},
};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup, KeyboardRemove},
};

type InterviewDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Per-chat dialogue state. Every state past the name prompt carries the interview.
#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    ReceiveFullName,
    ReceiveApiKey {
        interview: Interview,
    },
    ReceiveAmountOfQuestions {
        interview: Interview,
    },
    Interviewing {
        interview: Interview,
    },
}

/// Process-wide collaborators shared by every chat.
struct App {
    config: Config,
    pool: FallbackPool,
    leaderboard: LeaderboardStore,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting interview bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return;
        }
    };

    let bot = Bot::from_env();

    let pool = FallbackPool::default();
    log::info!("{} predefined questions loaded", pool.questions().len());

    let leaderboard = LeaderboardStore::new(config.leaderboard_path.clone());
    log::info!("Leaderboard file: {}", leaderboard.path().display());

    let app = Arc::new(App {
        config,
        pool,
        leaderboard,
    });

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::filter(|msg: Message| msg.text() == Some(EXIT_BUTTON)).endpoint(exit))
            .branch(dptree::filter(|msg: Message| msg.text() == Some(QUIT_BUTTON)).endpoint(quit))
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveFullName].endpoint(receive_full_name))
            .branch(dptree::case![State::ReceiveApiKey { interview }].endpoint(receive_api_key))
            .branch(
                dptree::case![State::ReceiveAmountOfQuestions { interview }]
                    .endpoint(receive_amount_of_questions),
            )
            .branch(dptree::case![State::Interviewing { interview }].endpoint(receive_answer)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new(), app])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const SKIP_BUTTON: &str = "Skip";
const QUIT_BUTTON: &str = "Quit Interview";
const EXIT_BUTTON: &str = "Exit";

fn control_row() -> Vec<KeyboardButton> {
    vec![
        KeyboardButton::new(QUIT_BUTTON),
        KeyboardButton::new(EXIT_BUTTON),
    ]
}

const GREETING_TEXT: &str = "Hi! I am an Excel mock interviewer. Answer the questions, and your score goes on the leaderboard. What is your name?";
async fn start(bot: Bot, dialogue: InterviewDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;
    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

async fn receive_full_name(bot: Bot, dialogue: InterviewDialogue, msg: Message) -> HandlerResult {
    let mut interview = Interview::new();
    let started = msg.text().map(|name| interview.start(name));
    if !matches!(started, Some(Ok(()))) {
        bot.send_message(msg.chat.id, "Please enter your name (as text)")
            .await?;
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        format!(
            "Nice to meet you, {}!\nSend your ChatGPT API key to get generated questions, or press \"{}\" to use predefined ones.",
            interview.candidate(),
            SKIP_BUTTON
        ),
    )
    .reply_markup(KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(SKIP_BUTTON)],
        control_row(),
    ]))
    .await?;

    dialogue.update(State::ReceiveApiKey { interview }).await?;
    Ok(())
}

async fn receive_api_key(
    bot: Bot,
    dialogue: InterviewDialogue,
    app: Arc<App>,
    mut interview: Interview,
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send the key as text or press \"Skip\"")
            .await?;
        return Ok(());
    };

    let api_key = if text == SKIP_BUTTON {
        app.config.default_api_key.as_deref()
    } else {
        // Keys should not linger in the chat history; failing to delete is harmless.
        let _ = bot.delete_message(msg.chat.id, msg.id).await;
        Some(text)
    };

    let notice = match interview.configure_source(api_key, &app.config.generator)? {
        SourceSetup::Generative => "Question generator configured successfully!".to_string(),
        SourceSetup::Skipped => {
            "Skipping the question generator. Predefined questions will be used.".to_string()
        }
        SourceSetup::Rejected(reason) => format!(
            "Failed to configure the question generator ({}). Predefined questions will be used.",
            reason
        ),
    };
    bot.send_message(msg.chat.id, notice).await?;

    let keyboard = KeyboardMarkup::new(vec![
        vec![KeyboardButton::new("5"), KeyboardButton::new("10")],
        vec![KeyboardButton::new("20"), KeyboardButton::new("50")],
        control_row(),
    ]);
    bot.send_message(
        msg.chat.id,
        format!(
            "How many questions? Choose between {} and {}.",
            MIN_QUESTIONS, MAX_QUESTIONS
        ),
    )
    .reply_markup(keyboard)
    .await?;

    dialogue
        .update(State::ReceiveAmountOfQuestions { interview })
        .await?;
    Ok(())
}

async fn receive_amount_of_questions(
    bot: Bot,
    dialogue: InterviewDialogue,
    app: Arc<App>,
    mut interview: Interview,
    msg: Message,
) -> HandlerResult {
    let Some(amount) = msg.text().and_then(|text| text.trim().parse::<usize>().ok()) else {
        bot.send_message(msg.chat.id, "Please enter a number").await?;
        return Ok(());
    };

    // Generation can take a while; the indicator is best effort.
    let _ = bot
        .send_chat_action(msg.chat.id, ChatAction::Typing)
        .await;

    let generator = interview.api_key().and_then(|key| {
        ChatGptGenerator::connect(key, &app.config.generator)
            .map_err(|e| log::warn!("Question generator unavailable: {}", e))
            .ok()
    });
    let source = QuestionSource::new(generator, app.pool.clone());
    if interview.is_configured() && !source.has_generator() {
        bot.send_message(
            msg.chat.id,
            "The question generator is unavailable. Predefined questions will be used.",
        )
        .await?;
    }

    match interview.set_question_count(amount, &source).await {
        Ok(()) => {}
        Err(e @ InterviewError::QuestionCountOutOfRange { .. }) => {
            bot.send_message(msg.chat.id, format!("Please try again: {}", e))
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    bot.send_message(msg.chat.id, "Great! Let's begin the interview.")
        .await?;
    send_current_question(&bot, msg.chat.id, &interview).await?;

    dialogue.update(State::Interviewing { interview }).await?;
    Ok(())
}

async fn receive_answer(
    bot: Bot,
    dialogue: InterviewDialogue,
    app: Arc<App>,
    mut interview: Interview,
    msg: Message,
) -> HandlerResult {
    let Some(answer) = msg.text() else {
        bot.send_message(msg.chat.id, "Please choose one of the options")
            .await?;
        return Ok(());
    };

    interview.submit_answer(answer)?;

    if interview.stage() == Stage::Completed {
        return finish_interview(&bot, &dialogue, &app, interview, msg.chat.id).await;
    }

    send_current_question(&bot, msg.chat.id, &interview).await?;
    dialogue.update(State::Interviewing { interview }).await?;
    Ok(())
}

async fn send_current_question(bot: &Bot, chat_id: ChatId, interview: &Interview) -> HandlerResult {
    let Some(question) = interview.current_question() else {
        return Ok(());
    };

    let mut rows = question
        .options
        .iter()
        .map(|option| vec![KeyboardButton::new(option.clone())])
        .collect::<Vec<_>>();
    rows.push(control_row());

    let text = render_question(
        interview.current_index() + 1,
        interview.questions().len(),
        question,
    );
    bot.send_message(chat_id, text)
        .reply_markup(KeyboardMarkup::new(rows))
        .await?;
    Ok(())
}

/// Reports, records and shows the leaderboard, then waits for a new candidate.
async fn finish_interview(
    bot: &Bot,
    dialogue: &InterviewDialogue,
    app: &App,
    interview: Interview,
    chat_id: ChatId,
) -> HandlerResult {
    match summarize(&interview) {
        Ok(report) => {
            bot.send_message(chat_id, render_report(&report))
                .reply_markup(KeyboardRemove::new())
                .await?;

            // The report is already shown; a failed write only costs the leaderboard row.
            if let Err(e) = app.leaderboard.record(report.leaderboard_entry()) {
                log::warn!("Failed to save result for {:?}: {}", report.candidate, e);
                bot.send_message(
                    chat_id,
                    format!("Warning: your result could not be saved to the leaderboard ({})", e),
                )
                .await?;
            }

            match app.leaderboard.read_all() {
                Ok(entries) => {
                    bot.send_message(chat_id, render_leaderboard(&entries, LEADERBOARD_ROWS))
                        .await?;
                }
                Err(e) => log::warn!("Failed to read leaderboard: {}", e),
            }
        }
        Err(InterviewError::NoQuestions) => {
            bot.send_message(chat_id, "The interview ended before any questions were asked.")
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
        Err(e) => return Err(e.into()),
    }

    bot.send_message(chat_id, "Send your name to start a new interview.")
        .await?;
    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

fn take_interview(state: State) -> Option<Interview> {
    match state {
        State::ReceiveApiKey { interview }
        | State::ReceiveAmountOfQuestions { interview }
        | State::Interviewing { interview } => Some(interview),
        State::Start | State::ReceiveFullName => None,
    }
}

async fn quit(bot: Bot, dialogue: InterviewDialogue, app: Arc<App>, msg: Message) -> HandlerResult {
    let state = dialogue.get().await?.unwrap_or_default();
    let Some(mut interview) = take_interview(state) else {
        return exit(bot, dialogue, msg).await;
    };

    interview.quit()?;
    finish_interview(&bot, &dialogue, &app, interview, msg.chat.id).await
}

async fn exit(bot: Bot, dialogue: InterviewDialogue, msg: Message) -> HandlerResult {
    let state = dialogue.get().await?.unwrap_or_default();
    if let Some(interview) = take_interview(state) {
        interview.exit();
    }

    bot.send_message(
        msg.chat.id,
        "Interview exited. Send your name to start a new interview.",
    )
    .reply_markup(KeyboardRemove::new())
    .await?;
    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

use crate::approval::confirm;
use crate::output;
use crate::Cli;
use anyhow::Context;
use foreman_core::action::Action;
use foreman_core::executor;
use foreman_core::session::Session;
use gemini_agent::{
    base_prompt, load_api_key, ActionResponse, Engine, HttpTransport, ModelTransport,
    DECLINED_NOTICE,
};
use std::io::{BufRead, Write};

/// The interactive conversational loop: one user turn, one model call, an
/// optional approval gate, one executed action, one state save.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let api_key = load_api_key(&cli.key_file).context("could not load API key")?;
    let transport = HttpTransport::new(&cli.base_url, &cli.model, &api_key)
        .context("could not build HTTP client")?;
    let engine = Engine::new(transport);

    let mut session = startup(&cli, &engine).await?;

    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        match engine.send(&mut session.history, text).await {
            Ok(response) => {
                println!("\nAI: {}", response.message);
                let mut input = std::io::stdin().lock();
                handle_action(&cli, &mut session, response, &mut input)?;
            }
            // A failed turn never ends the session; the loop continues.
            Err(e) => println!("Sorry, I encountered an error. Please try again. ({e})"),
        }
    }
    Ok(())
}

/// Resume a saved session or seed a fresh one with the system prompt and
/// an opening greeting.
async fn startup<T: ModelTransport>(cli: &Cli, engine: &Engine<T>) -> anyhow::Result<Session> {
    if let Some(session) = Session::load(&cli.state_file).context("could not read session file")? {
        println!("Loaded session from '{}'.", cli.state_file.display());
        if let Some(root) = &session.root_dir {
            println!("Current project directory: {}", root.display());
        }
        println!("Resuming previous conversation...");
        return Ok(session);
    }

    println!("Welcome to foreman! Type 'exit' to quit.");
    let mut session = Session::default();
    session.push_user(base_prompt());
    match engine.send(&mut session.history, "Greet me.").await {
        Ok(response) => println!("\nAI: {}", response.message),
        Err(e) => println!("Sorry, I couldn't reach the model yet. ({e})"),
    }
    Ok(session)
}

/// Gate, execute, and persist one action.
fn handle_action(
    cli: &Cli,
    session: &mut Session,
    response: ActionResponse,
    input: &mut impl BufRead,
) -> anyhow::Result<()> {
    let mut action = response.action;

    // init_project without a name asks the operator before the gate, so
    // the approval text can name the directory it will create.
    if let Action::InitProject(payload) = &mut action {
        if payload.project_name.is_none() {
            let name = prompt_line("What's the name of the new project? ", input)?;
            if !name.is_empty() {
                payload.project_name = Some(name);
            }
        }
    }

    if response.requires_approval {
        if let Some(description) = action.describe() {
            println!("\nWith your approval, I will {description}");
        }
        if !confirm(input, &mut std::io::stdout())? {
            println!("Action cancelled. Please provide new instructions.");
            session.push_user(DECLINED_NOTICE);
            save(cli, session)?;
            return Ok(());
        }
    }

    let result = executor::execute(&action, session, &cli.root);
    output::print_result(&result);
    save(cli, session)
}

fn prompt_line(prompt: &str, input: &mut impl BufRead) -> anyhow::Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Persist the session once a project exists. Full-file overwrite; a crash
/// between execution and save loses at most the latest turn.
fn save(cli: &Cli, session: &mut Session) -> anyhow::Result<()> {
    if session.root_dir.is_some() {
        session
            .save(&cli.state_file)
            .context("could not save session")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use foreman_core::session::ChatRole;
    use std::collections::BTreeMap;
    use std::ffi::OsStr;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn cli_for(dir: &TempDir) -> Cli {
        let state = dir.path().join("session.json");
        Cli::parse_from([
            OsStr::new("foreman"),
            OsStr::new("--root"),
            dir.path().as_os_str(),
            OsStr::new("--state-file"),
            state.as_os_str(),
        ])
    }

    fn project_session(dir: &TempDir) -> Session {
        let root = dir.path().join("proj");
        std::fs::create_dir(&root).unwrap();
        let mut session = Session::default();
        session.root_dir = Some(root);
        session.push_user("set up a project for me");
        session.push_model("{\"message\":\"ok\"}");
        session
    }

    fn create_notes(requires_approval: bool) -> ActionResponse {
        let mut files = BTreeMap::new();
        files.insert("notes.txt".to_string(), "draft".to_string());
        ActionResponse {
            message: "Creating notes.txt".to_string(),
            requires_approval,
            action: Action::CreateFiles(files),
        }
    }

    #[test]
    fn declining_leaves_the_project_untouched() {
        let dir = TempDir::new().unwrap();
        let cli = cli_for(&dir);
        let mut session = project_session(&dir);
        let turns_before = session.history.len();

        let mut input = Cursor::new(b"n\n".to_vec());
        handle_action(&cli, &mut session, create_notes(true), &mut input).unwrap();

        let root = session.root_dir.clone().unwrap();
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
        assert_eq!(session.history.len(), turns_before + 1);
        let last = session.history.last().unwrap();
        assert_eq!(last.role, ChatRole::User);
        assert_eq!(last.text, DECLINED_NOTICE);
    }

    #[test]
    fn approving_executes_without_an_extra_turn() {
        let dir = TempDir::new().unwrap();
        let cli = cli_for(&dir);
        let mut session = project_session(&dir);
        let turns_before = session.history.len();

        let mut input = Cursor::new(b"y\n".to_vec());
        handle_action(&cli, &mut session, create_notes(true), &mut input).unwrap();

        let root = session.root_dir.clone().unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("notes.txt")).unwrap(),
            "draft"
        );
        assert_eq!(session.history.len(), turns_before);
    }

    #[test]
    fn ungated_actions_execute_without_consulting_the_operator() {
        let dir = TempDir::new().unwrap();
        let cli = cli_for(&dir);
        let mut session = project_session(&dir);

        // A decline sitting in the input stream must never be consumed
        // when the model did not ask for approval.
        let mut input = Cursor::new(b"n\n".to_vec());
        handle_action(&cli, &mut session, create_notes(false), &mut input).unwrap();

        assert_eq!(input.position(), 0);
        let root = session.root_dir.clone().unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("notes.txt")).unwrap(),
            "draft"
        );
    }
}

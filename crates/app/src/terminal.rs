//! Line-oriented driver: renders session state to a writer and feeds user input back
//! into the engine. All quiz rules live in `services`; this only translates.

use std::io::{self, BufRead, Write};

use quiz_core::QuestionBank;
use services::{OptionMark, PageView, QuizError, QuizSession};

pub fn print_groups(bank: &QuestionBank, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "ALL ({} questions)", bank.questions().len())?;
    for group in bank.groups() {
        let members = bank
            .questions()
            .iter()
            .filter(|q| group.contains(q.id()))
            .count();
        let spans: Vec<String> = group
            .ranges()
            .iter()
            .map(|r| format!("{}-{}", r.start(), r.end()))
            .collect();
        writeln!(
            out,
            "{} ({members} questions) [{}]",
            group.name(),
            spans.join(", ")
        )?;
    }
    Ok(())
}

/// Run selection → quiz cycles until the user declines another round or input ends.
pub fn play(
    session: &mut QuizSession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    loop {
        if !choose(session, input, out)? {
            return Ok(());
        }
        match session.start() {
            Ok(_) => {}
            Err(QuizError::EmptyWorkingSet { group }) => {
                writeln!(out, "No questions in {group}.")?;
                session.return_to_selection();
                continue;
            }
            Err(err) => return Err(io::Error::other(err)),
        }

        if !run_quiz(session, input, out)? {
            return Ok(());
        }
        session.return_to_selection();

        match prompt(input, out, "Play again? [y/N] ")? {
            Some(answer) if is_yes(&answer) => {}
            _ => return Ok(()),
        }
    }
}

fn choose(
    session: &mut QuizSession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<bool> {
    let names: Vec<String> = session
        .available_groups()
        .into_iter()
        .map(str::to_string)
        .collect();
    for (i, name) in names.iter().enumerate() {
        writeln!(out, "  {}. {name}", i + 1)?;
    }

    loop {
        let current = session.selected_group().name().to_string();
        let Some(answer) = prompt(input, out, &format!("Group [{current}]: "))? else {
            return Ok(false);
        };
        let picked = match answer.parse::<usize>() {
            Ok(n) if (1..=names.len()).contains(&n) => names[n - 1].clone(),
            _ if answer.is_empty() => current,
            _ => answer,
        };
        match session.set_group_name(&picked) {
            Ok(()) => break,
            Err(err) => writeln!(out, "{err}")?,
        }
    }

    let default = if session.random_order() { "Y/n" } else { "y/N" };
    let Some(answer) = prompt(input, out, &format!("Random order? [{default}] "))? else {
        return Ok(false);
    };
    if !answer.is_empty() {
        session.set_random_order(is_yes(&answer));
    }
    Ok(true)
}

fn run_quiz(
    session: &mut QuizSession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<bool> {
    loop {
        let Some(view) = PageView::from_session(session) else {
            return Ok(true);
        };
        writeln!(out, "\nPage {}/{}", view.page_index + 1, view.total_pages)?;

        for question in &view.questions {
            writeln!(out, "{}. {}", question.id, question.prompt)?;
            for (i, option) in question.options.iter().enumerate() {
                writeln!(out, "   {}) {}", i + 1, option.text)?;
            }
            loop {
                let Some(answer) = prompt(input, out, "Answer: ")? else {
                    return Ok(false);
                };
                let choice = answer
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| question.options.get(i));
                match choice {
                    Some(option) => {
                        session
                            .select_option(question.id, &option.text)
                            .map_err(io::Error::other)?;
                        break;
                    }
                    None => writeln!(out, "Pick 1-{}", question.options.len())?,
                }
            }
        }

        let result = session.check_page().map_err(io::Error::other)?;
        if let Some(view) = PageView::from_session(session) {
            print_marks(&view, out)?;
        }
        let progress = session.progress();
        writeln!(
            out,
            "Page: {} correct, {} wrong | Progress: {}% • Correct: {} • Wrong: {}",
            result.correct, result.wrong, progress.percent, progress.correct, progress.wrong
        )?;

        if progress.is_complete {
            writeln!(out, "Quiz complete!")?;
            return Ok(true);
        }
        if prompt(input, out, "Press Enter for the next page ")?.is_none() {
            return Ok(false);
        }
        session.next_page().map_err(io::Error::other)?;
    }
}

fn print_marks(view: &PageView, out: &mut impl Write) -> io::Result<()> {
    for question in &view.questions {
        for option in &question.options {
            let tag = match option.mark {
                OptionMark::Correct => "+",
                OptionMark::Incorrect => "x",
                OptionMark::Unmarked if option.selected => "*",
                OptionMark::Unmarked => continue,
            };
            writeln!(out, "  [{tag}] {}. {}", question.id, option.text)?;
        }
    }
    Ok(())
}

fn prompt(input: &mut impl BufRead, out: &mut impl Write, text: &str) -> io::Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

pub mod room;
pub mod tree;

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::accusation::{self, Verdict};
use crate::clues::ClueIndex;
use crate::game::room::{truncate_chars, RoomId, Side, MAX_NAME};
use crate::game::tree::RoomMap;
use crate::scenario::Scenario;
use crate::suspects::SuspectDirectory;

const RULE: &str = "=============================================";

// ---------------------------------------------------------------------------
// Player commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Go(Side),
    Exit,
    Invalid(char),
}

/// Interpret one input line. Only the first non-blank character counts
/// (`e` left, `d` right, `s` exit, any case). Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let c = line.trim_start().chars().next()?;
    Some(match c.to_ascii_lowercase() {
        'e' => Command::Go(Side::Left),
        'd' => Command::Go(Side::Right),
        's' => Command::Exit,
        _ => Command::Invalid(c),
    })
}

/// One line of player input, decoded lossily. `None` at end of input or
/// on a read error, which is logged.
fn read_input_line<R: BufRead>(input: &mut R, what: &str) -> Option<String> {
    let mut buf = Vec::new();
    match input.read_until(b'\n', &mut buf) {
        Ok(0) => None,
        Ok(_) => Some(String::from_utf8_lossy(&buf).into_owned()),
        Err(e) => {
            warn!("Failed to read {what}: {e}");
            None
        }
    }
}

/// Next non-blank command, or `None` once input is exhausted or unreadable.
fn read_command<R: BufRead>(input: &mut R) -> Option<Command> {
    loop {
        let line = read_input_line(input, "command")?;
        if let Some(cmd) = parse_command(&line) {
            return Some(cmd);
        }
    }
}

// ---------------------------------------------------------------------------
// Exploration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The player chose to stop.
    PlayerExit,
    /// Reached a room with no exits while leaf termination is on.
    DeadEnd,
    /// Input ran out; handled like an exit.
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorationState {
    Idle,
    AtRoom(RoomId),
    Finished(EndReason),
}

/// Walks the room tree, moving clues from rooms into the clue index.
pub struct Explorer<'a> {
    map: &'a mut RoomMap,
    clues: &'a mut ClueIndex,
    stop_at_leaf: bool,
    state: ExplorationState,
    /// Every time a room is shown counts, including re-prompts.
    visits: usize,
}

impl<'a> Explorer<'a> {
    pub fn new(map: &'a mut RoomMap, clues: &'a mut ClueIndex, stop_at_leaf: bool) -> Self {
        Self {
            map,
            clues,
            stop_at_leaf,
            state: ExplorationState::Idle,
            visits: 0,
        }
    }

    pub fn state(&self) -> ExplorationState {
        self.state
    }

    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Place the cursor on the root room.
    pub fn start(&mut self) {
        if self.state == ExplorationState::Idle {
            self.state = ExplorationState::AtRoom(self.map.root());
        }
    }

    /// Show the current room and pick up its clue, if any is left.
    pub fn visit<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let ExplorationState::AtRoom(id) = self.state else {
            return Ok(());
        };
        let room = self
            .map
            .get_mut(id)
            .with_context(|| format!("cursor points at missing room {id}"))?;
        self.visits += 1;
        debug!("Entered room {id} ({})", room.name);

        writeln!(out, "\nYou entered: {}", room.name)?;
        match room.take_clue() {
            Some(clue) => {
                writeln!(out, "Clue found: \"{clue}\"")?;
                info!("Collected clue \"{clue}\" in {}", room.name);
                let repeat = self.clues.contains(&clue);
                let added = self.clues.insert(&clue);
                if repeat {
                    let fate = if added { "kept" } else { "discarded" };
                    debug!("Duplicate clue \"{clue}\" {fate}");
                }
            }
            None => writeln!(out, "No clue in this room (or already collected).")?,
        }

        if self.stop_at_leaf && room.is_leaf() {
            writeln!(out, "There are no more paths to follow. Exploration over.")?;
            self.finish(EndReason::DeadEnd);
        }
        Ok(())
    }

    /// Apply one command to the current room.
    pub fn apply<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<ExplorationState> {
        let ExplorationState::AtRoom(id) = self.state else {
            return Ok(self.state);
        };
        match cmd {
            Command::Go(side) => {
                let next = self.map.get(id).and_then(|room| room.child(side));
                match next {
                    Some(next) => {
                        debug!("Transition: {id} -> {next} ({})", side.as_str());
                        self.state = ExplorationState::AtRoom(next);
                    }
                    None => writeln!(out, "There is no path to the {}.", side.as_str())?,
                }
            }
            Command::Exit => {
                writeln!(out, "You ended the exploration.")?;
                self.finish(EndReason::PlayerExit);
            }
            Command::Invalid(c) => {
                debug!("Invalid option '{c}' in room {id}");
                writeln!(out, "Invalid option.")?;
            }
        }
        Ok(self.state)
    }

    pub fn finish(&mut self, reason: EndReason) {
        info!("Exploration finished: {reason:?} after {} visits", self.visits);
        self.state = ExplorationState::Finished(reason);
    }
}

/// Drive the explorer from `input` until the player leaves.
pub fn explore<R: BufRead, W: Write>(
    explorer: &mut Explorer<'_>,
    input: &mut R,
    out: &mut W,
) -> Result<EndReason> {
    explorer.start();
    loop {
        explorer.visit(out)?;
        if let ExplorationState::Finished(reason) = explorer.state() {
            return Ok(reason);
        }

        write!(out, "\nChoose: (e) left  (d) right  (s) exit\nOption: ")?;
        out.flush()?;

        match read_command(input) {
            Some(cmd) => {
                explorer.apply(cmd, out)?;
            }
            None => {
                writeln!(out)?;
                writeln!(out, "You ended the exploration.")?;
                explorer.finish(EndReason::InputClosed);
            }
        }

        if let ExplorationState::Finished(reason) = explorer.state() {
            return Ok(reason);
        }
    }
}

// ---------------------------------------------------------------------------
// Accusation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accusation {
    /// No name was given.
    Skipped,
    Judged {
        accused: String,
        matches: usize,
        verdict: Verdict,
    },
}

/// Read the accused name: first line, trimmed, capped at [`MAX_NAME`].
/// End of input or an unreadable line reads as an empty name.
fn read_accused<R: BufRead>(input: &mut R) -> String {
    let line = read_input_line(input, "accused name").unwrap_or_default();
    truncate_chars(line.trim(), MAX_NAME).trim_end().to_string()
}

fn accuse<R: BufRead, W: Write>(
    clues: &ClueIndex,
    directory: &SuspectDirectory,
    input: &mut R,
    out: &mut W,
) -> Result<Accusation> {
    let roster = directory.suspects();
    if !directory.is_empty() {
        writeln!(out, "\nSuspects: {}", roster.join(", "))?;
    }
    match roster.first() {
        Some(example) => write!(out, "\nName the suspect you accuse (e.g. '{example}'): ")?,
        None => write!(out, "\nName the suspect you accuse: ")?,
    }
    out.flush()?;

    let accused = read_accused(input);
    if accused.is_empty() {
        writeln!(out, "\nNo suspect named. Skipping the accusation.")?;
        return Ok(Accusation::Skipped);
    }

    let (matches, verdict) = accusation::evaluate(clues, directory, &accused);
    info!("Accused \"{accused}\": {matches} matching clue(s), {verdict:?}");

    writeln!(out, "\nYou accused: \"{accused}\"")?;
    writeln!(out, "Clues pointing to {accused}: {matches}")?;
    match verdict {
        Verdict::Guilty => writeln!(
            out,
            "\n>>> Verdict: SUFFICIENT EVIDENCE. {accused} is found GUILTY."
        )?,
        Verdict::NotGuilty => writeln!(
            out,
            "\n>>> Verdict: INSUFFICIENT EVIDENCE. {accused} cannot be convicted."
        )?,
    }

    Ok(Accusation::Judged {
        accused,
        matches,
        verdict,
    })
}

// ---------------------------------------------------------------------------
// Single round
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RoundOutcome {
    pub ended_by: EndReason,
    pub visits: usize,
    /// Collected clues in alphabetical order.
    pub clues: Vec<String>,
    pub accusation: Accusation,
}

fn show_clues<W: Write>(clues: &ClueIndex, out: &mut W) -> Result<()> {
    writeln!(out, "\n{RULE}")?;
    writeln!(out, " COLLECTED CLUES (alphabetical)")?;
    writeln!(out, "{RULE}")?;
    if clues.is_empty() {
        writeln!(out, "No clues collected.")?;
    }
    for clue in clues.in_order() {
        writeln!(out, " - {clue}")?;
    }
    Ok(())
}

pub fn play_round<R: BufRead, W: Write>(
    scenario: &Scenario,
    input: &mut R,
    out: &mut W,
) -> Result<RoundOutcome> {
    let mut map = scenario.build_map().context("failed to build room map")?;
    let directory = scenario.build_directory();
    let mut clues = ClueIndex::new(scenario.duplicate_clues);

    info!(
        "Round started: {} rooms (depth {}), {} clue/suspect links",
        map.len(),
        map.depth(),
        directory.len()
    );

    writeln!(out, "{RULE}")?;
    writeln!(out, " {}", scenario.title)?;
    writeln!(out, "{RULE}")?;
    if let Some(root) = map.get(map.root()) {
        writeln!(out, "Starting the investigation at {}.", root.name)?;
    }

    let mut explorer = Explorer::new(&mut map, &mut clues, scenario.stop_at_leaf);
    let ended_by = explore(&mut explorer, input, out)?;
    let visits = explorer.visits();
    info!("{} clue(s) collected in {visits} visits", clues.len());

    show_clues(&clues, out)?;
    let accusation = accuse(&clues, &directory, input, out)?;

    Ok(RoundOutcome {
        ended_by,
        visits,
        clues: clues.in_order().into_iter().map(String::from).collect(),
        accusation,
    })
}

// ---------------------------------------------------------------------------
// Public entry point: plays rounds until the player quits
// ---------------------------------------------------------------------------

/// Ask whether to play again. End of input means quit.
fn prompt_restart<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<bool> {
    writeln!(out, "\n  [r] Restart    [q] Quit")?;
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = read_input_line(input, "restart choice") else {
            return Ok(false);
        };
        match line.trim().to_lowercase().as_str() {
            "r" => return Ok(true),
            "q" => return Ok(false),
            _ => writeln!(out, "  Press [r] to restart or [q] to quit.")?,
        }
    }
}

pub fn run<R: BufRead, W: Write>(scenario: &Scenario, input: &mut R, out: &mut W) -> Result<()> {
    loop {
        let outcome = play_round(scenario, input, out)?;
        info!(
            "Round over: {:?} after {} visits, {} clue(s), accusation {:?}",
            outcome.ended_by,
            outcome.visits,
            outcome.clues.len(),
            outcome.accusation
        );

        if !prompt_restart(input, out)? {
            writeln!(out, "\nThanks for playing {}!", scenario.title)?;
            break;
        }

        info!("Player chose to restart");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{self, BufReader, Cursor, Read};

    use super::*;
    use crate::clues::DuplicatePolicy;
    use crate::scenario::{RoomSpec, SuspectLink};

    fn play(scenario: &Scenario, script: &str) -> (RoundOutcome, String) {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let outcome = play_round(scenario, &mut input, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("e\n"), Some(Command::Go(Side::Left)));
        assert_eq!(parse_command("  D"), Some(Command::Go(Side::Right)));
        assert_eq!(parse_command("Sair"), Some(Command::Exit));
        assert_eq!(parse_command("esquerda"), Some(Command::Go(Side::Left)));
        assert_eq!(parse_command("x"), Some(Command::Invalid('x')));
        assert_eq!(parse_command("   \n"), None);
    }

    #[test]
    fn test_read_command_skips_blank_lines() {
        let mut input = Cursor::new(b"\n  \nd\n".to_vec());
        assert_eq!(read_command(&mut input), Some(Command::Go(Side::Right)));
        assert_eq!(read_command(&mut input), None);
    }

    #[test]
    fn test_explorer_state_machine() {
        let mut map = Scenario::mansion().build_map().unwrap();
        let mut clues = ClueIndex::default();
        let mut out = Vec::new();
        let root = map.root();

        let mut explorer = Explorer::new(&mut map, &mut clues, false);
        assert_eq!(explorer.state(), ExplorationState::Idle);
        explorer.start();
        assert_eq!(explorer.state(), ExplorationState::AtRoom(root));

        let state = explorer.apply(Command::Invalid('?'), &mut out).unwrap();
        assert_eq!(state, ExplorationState::AtRoom(root));

        let state = explorer.apply(Command::Go(Side::Right), &mut out).unwrap();
        let ExplorationState::AtRoom(biblioteca) = state else {
            panic!("expected to be in a room, got {state:?}");
        };
        // Biblioteca has no left exit
        let state = explorer.apply(Command::Go(Side::Left), &mut out).unwrap();
        assert_eq!(state, ExplorationState::AtRoom(biblioteca));

        let state = explorer.apply(Command::Exit, &mut out).unwrap();
        assert_eq!(state, ExplorationState::Finished(EndReason::PlayerExit));

        // Finished is final
        let state = explorer.apply(Command::Go(Side::Right), &mut out).unwrap();
        assert_eq!(state, ExplorationState::Finished(EndReason::PlayerExit));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Invalid option."));
        assert!(text.contains("There is no path to the left."));
    }

    #[test]
    fn test_left_left_exit_then_accuse() {
        let (outcome, text) = play(&Scenario::mansion(), "e\ne\ns\nSr. Verdes\n");

        assert_eq!(outcome.ended_by, EndReason::PlayerExit);
        assert_eq!(
            outcome.clues,
            vec![
                "Luvas com manchas vermelhas",
                "Pegadas sujas no tapete",
                "Uma xícara quebrada com monograma X",
            ]
        );
        assert_eq!(
            outcome.accusation,
            Accusation::Judged {
                accused: "Sr. Verdes".into(),
                matches: 1,
                verdict: Verdict::NotGuilty,
            }
        );

        let listing = text.split("COLLECTED CLUES").nth(1).unwrap();
        let luvas = listing.find(" - Luvas").unwrap();
        let pegadas = listing.find(" - Pegadas").unwrap();
        let xicara = listing.find(" - Uma xícara").unwrap();
        assert!(luvas < pegadas && pegadas < xicara);
        assert!(text.contains("INSUFFICIENT EVIDENCE"));
    }

    #[test]
    fn test_two_clues_convict() {
        // Both clues on the left branch point at Sra. Xavier
        let scenario = Scenario {
            title: "Two rooms".into(),
            map: RoomSpec::new("Hall", Some("Página arrancada do diário")).left(RoomSpec::new(
                "Sala",
                Some("Uma xícara quebrada com monograma X"),
            )),
            suspects: Scenario::mansion().suspects,
            duplicate_clues: DuplicatePolicy::Keep,
            stop_at_leaf: false,
        };

        let (outcome, text) = play(&scenario, "e\ns\n  Sra. Xavier  \n");
        assert_eq!(
            outcome.accusation,
            Accusation::Judged {
                accused: "Sra. Xavier".into(),
                matches: 2,
                verdict: Verdict::Guilty,
            }
        );
        assert!(text.contains("SUFFICIENT EVIDENCE. Sra. Xavier is found GUILTY."));

        let (outcome, _) = play(&scenario, "s\nSra. Xavier\n");
        assert!(matches!(
            outcome.accusation,
            Accusation::Judged {
                matches: 1,
                verdict: Verdict::NotGuilty,
                ..
            }
        ));
    }

    #[test]
    fn test_revisit_does_not_recollect() {
        // An invalid option and a blocked path both redisplay the Hall.
        let (outcome, text) = play(&Scenario::mansion(), "x\nd\nd\ne\ns\n\n");

        assert_eq!(outcome.clues.len(), 3);
        assert_eq!(
            text.matches("Clue found: \"Pegadas sujas no tapete\"").count(),
            1
        );
        // Hall re-shown after "x", Porão re-shown after "e"
        assert_eq!(
            text.matches("No clue in this room (or already collected).").count(),
            2
        );
        assert_eq!(outcome.visits, 5);
    }

    #[test]
    fn test_non_utf8_accused_name_is_decoded_lossily() {
        let mut input = Cursor::new(b"s\nSr. Verd\xe9s\n".to_vec());
        let mut out = Vec::new();
        let outcome = play_round(&Scenario::mansion(), &mut input, &mut out).unwrap();

        assert_eq!(
            outcome.accusation,
            Accusation::Judged {
                accused: "Sr. Verd\u{FFFD}s".into(),
                matches: 0,
                verdict: Verdict::NotGuilty,
            }
        );
    }

    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin went away"))
        }
    }

    #[test]
    fn test_read_errors_skip_accusation_and_quit() {
        let mut input = BufReader::new(Cursor::new(b"s\n".to_vec()).chain(BrokenPipe));
        let mut out = Vec::new();
        run(&Scenario::mansion(), &mut input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No suspect named"));
        assert!(text.ends_with("Thanks for playing Detective Quest!\n"));
    }

    #[test]
    fn test_long_clues_and_names_match_after_truncation() {
        let clue_a = format!("Pegadas {}", "a".repeat(150));
        let clue_b = format!("Pegadas {}", "b".repeat(150));
        let suspect = format!("Sr. {}", "V".repeat(80));
        let scenario = Scenario {
            title: "Long".into(),
            map: RoomSpec::new("Hall", Some(&clue_a)).left(RoomSpec::new("Sala", Some(&clue_b))),
            suspects: [&clue_a, &clue_b]
                .into_iter()
                .map(|clue| SuspectLink {
                    clue: clue.clone(),
                    suspect: suspect.clone(),
                })
                .collect(),
            duplicate_clues: DuplicatePolicy::Keep,
            stop_at_leaf: false,
        };

        let (outcome, _) = play(&scenario, &format!("e\ns\n{suspect}\n"));
        assert!(matches!(
            outcome.accusation,
            Accusation::Judged {
                matches: 2,
                verdict: Verdict::Guilty,
                ..
            }
        ));
    }

    #[test]
    fn test_input_closed_exits_and_skips_accusation() {
        let (outcome, text) = play(&Scenario::mansion(), "e\n");

        assert_eq!(outcome.ended_by, EndReason::InputClosed);
        assert_eq!(outcome.clues.len(), 2);
        assert_eq!(outcome.accusation, Accusation::Skipped);
        assert!(text.contains("No suspect named"));
    }

    #[test]
    fn test_no_clues_collected() {
        let scenario = Scenario {
            title: "Empty".into(),
            map: RoomSpec::new("Hall", None),
            suspects: Vec::new(),
            duplicate_clues: DuplicatePolicy::Keep,
            stop_at_leaf: false,
        };
        let (outcome, text) = play(&scenario, "s\nSr. Verdes\n");

        assert!(outcome.clues.is_empty());
        assert!(text.contains("No clues collected."));
        assert!(matches!(
            outcome.accusation,
            Accusation::Judged { matches: 0, .. }
        ));
    }

    #[test]
    fn test_stop_at_leaf() {
        let mut scenario = Scenario::mansion();
        scenario.stop_at_leaf = true;

        // Hall -> Biblioteca -> Porão, which has no exits
        let (outcome, text) = play(&scenario, "d\nd\n\n");
        assert_eq!(outcome.ended_by, EndReason::DeadEnd);
        assert_eq!(outcome.clues.len(), 3);
        assert!(text.contains("There are no more paths to follow."));
        assert_eq!(outcome.accusation, Accusation::Skipped);
    }

    #[test]
    fn test_leaf_without_stop_keeps_prompting() {
        let (outcome, text) = play(&Scenario::mansion(), "d\nd\ne\ns\n\n");
        assert_eq!(outcome.ended_by, EndReason::PlayerExit);
        assert!(text.contains("There is no path to the left."));
    }

    #[test]
    fn test_duplicate_clues_follow_policy() {
        let map =
            RoomSpec::new("Hall", Some("Pegadas")).left(RoomSpec::new("Sala", Some("Pegadas")));
        let mut scenario = Scenario {
            title: "Dupes".into(),
            map,
            suspects: Vec::new(),
            duplicate_clues: DuplicatePolicy::Keep,
            stop_at_leaf: false,
        };

        let (outcome, _) = play(&scenario, "e\ns\n\n");
        assert_eq!(outcome.clues, vec!["Pegadas", "Pegadas"]);

        scenario.duplicate_clues = DuplicatePolicy::Discard;
        let (outcome, _) = play(&scenario, "e\ns\n\n");
        assert_eq!(outcome.clues, vec!["Pegadas"]);
    }

    #[test]
    fn test_run_restarts_with_fresh_map() {
        let mut input = Cursor::new(b"s\n\nr\ns\n\nq\n".to_vec());
        let mut out = Vec::new();
        run(&Scenario::mansion(), &mut input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.matches("Clue found: \"Pegadas sujas no tapete\"").count(),
            2
        );
        assert!(text.ends_with("Thanks for playing Detective Quest!\n"));
    }

    #[test]
    fn test_run_quits_on_closed_input() {
        let mut input = Cursor::new(b"s\n".to_vec());
        let mut out = Vec::new();
        run(&Scenario::mansion(), &mut input, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Thanks for playing"));
    }
}

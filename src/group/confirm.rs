use itertools::join;
use std::collections::BTreeSet;
use std::io::{self, BufRead, BufReader, Stderr, Stdin, Write};

/// Asks the operator a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// Prompts on one stream and reads the answer line from another.
pub struct TerminalConfirm<R, W> {
    input: R,
    output: W
}

impl TerminalConfirm<BufReader<Stdin>, Stderr> {
    pub fn stdio() -> Self {
        TerminalConfirm::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl <R: BufRead, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalConfirm { input, output }
    }
}

impl <R: BufRead, W: Write> Confirm for TerminalConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{} ", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Only an explicit yes counts; anything else, end of input included, is a no.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

pub fn merge_question(
    old_group: &str,
    old_topics: &BTreeSet<String>,
    new_group: &str,
    new_topics: &BTreeSet<String>
) -> String {
    format!(
        "Consumer Group: {new} already exists.\n\
         Topics subscribed to by the consumer groups are listed below:\n\
         {old}: {old_topics}\n\
         {new}: {new_topics}\n\
         Do you intend to merge the two consumer groups? (y/n)",
        old = old_group,
        old_topics = join(old_topics, ", "),
        new = new_group,
        new_topics = join(new_topics, ", "))
}

/// The question asked before touching a group that already holds offsets:
/// topics only the new group has make it a merge, topics holding the same
/// offsets as the old group look like an unfinished earlier rename.
pub fn gate_question(
    old_group: &str,
    old_topics: &BTreeSet<String>,
    new_group: &str,
    own_topics: &BTreeSet<String>,
    resumed: &BTreeSet<String>
) -> String {
    let mut question = String::new();
    if !resumed.is_empty() {
        question.push_str(&format!(
            "Consumer Group: {new} already holds the offsets of {old} for topic(s): {topics}.\n\
             This looks like an earlier rename of {old} to {new} that did not finish; \
             those offsets will be written again.\n",
            old = old_group,
            new = new_group,
            topics = join(resumed, ", ")));
    }
    if own_topics.is_empty() {
        question.push_str("Do you want to finish the rename? (y/n)");
    } else {
        question.push_str(&merge_question(old_group, old_topics, new_group, own_topics));
    }
    question
}

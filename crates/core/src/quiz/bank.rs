use crate::model::{Language, Level, Question};

/// A built-in question, stored as static text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankEntry {
    pub level: u8,
    pub language: Language,
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    pub correct_answer: usize,
    pub concept: &'static str,
}

impl BankEntry {
    fn to_question(self) -> Option<Question> {
        Question::new(
            self.prompt,
            self.options.iter().map(|opt| (*opt).to_string()).collect(),
            self.correct_answer,
            self.concept,
            None,
        )
        .ok()
    }
}

const fn entry(
    level: u8,
    language: Language,
    prompt: &'static str,
    options: [&'static str; 4],
    correct_answer: usize,
    concept: &'static str,
) -> BankEntry {
    BankEntry {
        level,
        language,
        prompt,
        options,
        correct_answer,
        concept,
    }
}

#[rustfmt::skip]
static BUILTIN: &[BankEntry] = &[
    entry(1, Language::JavaScript, "In JavaScript, which keyword is used to declare a variable that can be reassigned?", ["const", "let", "var", "all of the above"], 1, "Variables"),
    entry(1, Language::JavaScript, "What will 'typeof 42' return in JavaScript?", ["'int'", "'number'", "'integer'", "'float'"], 1, "Data Types"),
    entry(1, Language::JavaScript, "Which symbol is used for single-line comments in JavaScript?", ["#", "/*", "//", "<!--"], 2, "Basic Syntax"),
    entry(1, Language::JavaScript, "What is the correct way to declare a constant in JavaScript?", ["var PI = 3.14", "let PI = 3.14", "const PI = 3.14", "constant PI = 3.14"], 2, "Variables"),
    entry(1, Language::JavaScript, "Which value is a JavaScript string?", ["42", "true", "\"42\"", "null"], 2, "Data Types"),
    entry(1, Language::Python, "In Python, which of these is NOT a valid variable name?", ["my_var", "_private", "2ndVariable", "varTwo"], 2, "Variables"),
    entry(1, Language::Python, "What is the output of type(3.14) in Python?", ["<class 'int'>", "<class 'float'>", "<class 'double'>", "<class 'number'>"], 1, "Data Types"),
    entry(1, Language::Python, "How do you create a comment in Python?", ["// comment", "/* comment */", "# comment", "<!-- comment -->"], 2, "Basic Syntax"),
    entry(1, Language::Python, "Which operator is used to assign a value to a variable in Python?", ["set", "var", "let", "="], 3, "Variables"),
    entry(1, Language::Python, "What does len(\"code\") return in Python?", ["3", "4", "5", "Error"], 1, "Data Types"),
    entry(2, Language::JavaScript, "What is the correct syntax for an if statement in JavaScript?", ["if x > 5 then", "if (x > 5)", "if x > 5:", "if {x > 5}"], 1, "If/Else"),
    entry(2, Language::JavaScript, "Which operator checks for both value AND type equality in JavaScript?", ["==", "===", "=", "!="], 1, "Comparison Operators"),
    entry(2, Language::JavaScript, "What does '5 > 3 && 2 < 4' evaluate to?", ["true", "false", "undefined", "null"], 0, "Boolean Logic"),
    entry(2, Language::JavaScript, "Which statement is used when none of the if/else if conditions are true?", ["default", "else", "otherwise", "final"], 1, "If/Else"),
    entry(2, Language::JavaScript, "What does the ternary expression 5 > 3 ? \"yes\" : \"no\" return?", ["\"yes\"", "\"no\"", "true", "undefined"], 0, "Conditionals"),
    entry(2, Language::Python, "In Python, what comes after an if statement?", ["{", ":", "(", "["], 1, "If/Else"),
    entry(2, Language::Python, "Which keyword is used for alternative conditions in Python?", ["else if", "elseif", "elif", "otherwise"], 2, "If/Else"),
    entry(2, Language::Python, "What does 'not True' evaluate to in Python?", ["True", "False", "0", "1"], 1, "Boolean Logic"),
    entry(2, Language::Python, "Which operator checks if two values are equal in Python?", ["=", "==", "===", "is"], 1, "Comparison Operators"),
    entry(2, Language::Python, "Which keyword combines two conditions that must both be true in Python?", ["&&", "and", "both", "&"], 1, "Boolean Logic"),
    entry(3, Language::JavaScript, "Which loop is guaranteed to execute at least once?", ["for loop", "while loop", "do-while loop", "foreach loop"], 2, "Loops"),
    entry(3, Language::JavaScript, "What does 'break' do in a loop?", ["Skips current iteration", "Exits the loop completely", "Pauses the loop", "Restarts the loop"], 1, "Loop Control"),
    entry(3, Language::JavaScript, "What is the output of: for(let i=0; i<3; i++) console.log(i);", ["0 1 2", "1 2 3", "0 1 2 3", "1 2"], 0, "For Loops"),
    entry(3, Language::JavaScript, "Which statement skips the current iteration?", ["break", "continue", "skip", "next"], 1, "Loop Control"),
    entry(3, Language::JavaScript, "Which loop iterates over the values of an array in JavaScript?", ["for...in", "for...of", "for...each", "while...of"], 1, "For Loops"),
    entry(3, Language::Python, "Which loop in Python is used to iterate over a sequence?", ["while", "for", "do-while", "foreach"], 1, "Loops"),
    entry(3, Language::Python, "What does 'range(5)' produce in Python?", ["[1,2,3,4,5]", "[0,1,2,3,4]", "[0,1,2,3,4,5]", "[1,2,3,4]"], 1, "For Loops"),
    entry(3, Language::Python, "Which keyword exits a loop immediately in Python?", ["exit", "break", "stop", "end"], 1, "Loop Control"),
    entry(3, Language::Python, "What is the correct syntax for a while loop in Python?", ["while (x < 5):", "while x < 5:", "while {x < 5}:", "while x < 5 do:"], 1, "While Loops"),
    entry(3, Language::Python, "What does 'continue' do inside a Python loop?", ["Exits the loop", "Skips to the next iteration", "Restarts the loop", "Pauses the loop"], 1, "Loop Control"),
    entry(4, Language::JavaScript, "What keyword is used to define a function in JavaScript?", ["func", "function", "def", "method"], 1, "Functions"),
    entry(4, Language::JavaScript, "What does a function return if no return statement is specified?", ["null", "0", "undefined", "false"], 2, "Return Values"),
    entry(4, Language::JavaScript, "Which of these is a valid arrow function?", ["=> (x) {return x*2}", "(x) => x*2", "x -> x*2", "x => return x*2"], 1, "Functions"),
    entry(4, Language::JavaScript, "What is a closure in JavaScript?", ["A function that returns nothing", "A function with access to outer scope", "A function without parameters", "A recursive function"], 1, "Scope"),
    entry(4, Language::JavaScript, "What is a parameter with a default value in JavaScript?", ["function f(x = 1) {}", "function f(x: 1) {}", "function f(x := 1) {}", "function f(default x = 1) {}"], 0, "Parameters"),
    entry(4, Language::Python, "Which keyword is used to define a function in Python?", ["function", "def", "func", "define"], 1, "Functions"),
    entry(4, Language::Python, "What is returned if a Python function has no return statement?", ["0", "False", "None", "null"], 2, "Return Values"),
    entry(4, Language::Python, "How do you define a function parameter with a default value?", ["def func(x=5):", "def func(x default 5):", "def func(x := 5):", "def func(x: 5):"], 0, "Parameters"),
    entry(4, Language::Python, "What is *args used for in Python functions?", ["Fixed arguments", "Variable number of arguments", "Keyword arguments", "Return values"], 1, "Parameters"),
    entry(4, Language::Python, "What keyword creates a small anonymous function in Python?", ["def", "func", "lambda", "fn"], 2, "Functions"),
    entry(5, Language::JavaScript, "Which method adds an element to the end of a JavaScript array?", ["append()", "push()", "add()", "insert()"], 1, "Array Methods"),
    entry(5, Language::JavaScript, "What does array.map() do?", ["Filters elements", "Creates new array with transformed elements", "Sorts array", "Finds an element"], 1, "Array Methods"),
    entry(5, Language::JavaScript, "Which method removes the last element from an array?", ["pop()", "remove()", "delete()", "shift()"], 0, "Array Methods"),
    entry(5, Language::JavaScript, "What does array.filter() return?", ["First matching element", "Boolean", "New array with matching elements", "Index of element"], 2, "Array Methods"),
    entry(5, Language::JavaScript, "What does array.length return for [1, 2, 3]?", ["2", "3", "4", "undefined"], 1, "Arrays"),
    entry(5, Language::Python, "Which method adds an element to the end of a Python list?", ["push()", "add()", "append()", "insert()"], 2, "List Methods"),
    entry(5, Language::Python, "What does list.sort() return?", ["Sorted list", "New sorted list", "None", "True"], 2, "List Methods"),
    entry(5, Language::Python, "How do you access the last element of a list in Python?", ["list[-1]", "list[last]", "list.last()", "list[end]"], 0, "List Access"),
    entry(5, Language::Python, "What is list slicing [1:3] in Python?", ["Elements at index 1 and 3", "Elements from 1 to 3 (inclusive)", "Elements from index 1 to 2", "Elements after index 1"], 2, "List Slicing"),
    entry(5, Language::Python, "Which method removes and returns the last item of a Python list?", ["pop()", "remove()", "delete()", "last()"], 0, "List Methods"),
];

/// Offline question pool used by the standalone quiz.
#[derive(Debug, Clone, Copy)]
pub struct QuestionBank {
    entries: &'static [BankEntry],
}

impl QuestionBank {
    #[must_use]
    pub fn builtin() -> Self {
        Self { entries: BUILTIN }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Questions at `level` for `language` whose prompt is not in `exclude`
    /// (exact string match), in bank order.
    #[must_use]
    pub fn candidates(&self, level: Level, language: Language, exclude: &[String]) -> Vec<Question> {
        self.entries
            .iter()
            .filter(|e| e.level == level.value() && e.language == language)
            .filter(|e| !exclude.iter().any(|seen| seen == e.prompt))
            .filter_map(|e| e.to_question())
            .collect()
    }

    /// Languages the bank has questions for.
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.entries.iter().map(|e| e.language).collect();
        languages.sort();
        languages.dedup();
        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_has_a_full_batch_per_language() {
        let bank = QuestionBank::builtin();
        for language in bank.languages() {
            for level in 1..=5 {
                let level = Level::new(level).unwrap();
                assert!(bank.candidates(level, language, &[]).len() >= 5);
            }
        }
    }

    #[test]
    fn all_entries_are_valid_questions() {
        let bank = QuestionBank::builtin();
        assert!(BUILTIN.iter().all(|e| e.to_question().is_some()));
        assert_eq!(bank.len(), BUILTIN.len());
    }

    #[test]
    fn excluded_prompts_are_filtered_exactly() {
        let bank = QuestionBank::builtin();
        let level = Level::new(2).unwrap();
        let all = bank.candidates(level, Language::Python, &[]);
        let exclude = vec![all[0].prompt().to_string(), all[0].prompt().to_uppercase()];
        let rest = bank.candidates(level, Language::Python, &exclude);
        assert_eq!(rest.len(), all.len() - 1);
        assert!(rest.iter().all(|q| q.prompt() != all[0].prompt()));
    }

    #[test]
    fn unknown_language_has_no_candidates() {
        let bank = QuestionBank::builtin();
        assert!(bank.candidates(Level::MIN, Language::Go, &[]).is_empty());
    }
}

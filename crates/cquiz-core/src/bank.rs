//! The compiled-in question catalogue.
//!
//! [`QuestionBank::builtin`] is meant to be called once at startup; the bank
//! is then shared read-only with sessions as a `&[Question]`.

use crate::model::{Question, QuestionType, Rect};

pub const THEME_CONTROL_FLOW: &str = "ifs loops and operators";
pub const THEME_POINTERS: &str = "strings arrays and pointers";
pub const THEME_MEMORY: &str = "functions structs and memory";

const CLICK_PROMPT: &str =
    "Click the bug (once clicked press next, clicking again will overwrite your first answer).";

/// An ordered, immutable collection of questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The built-in C programming catalogue spanning three themes.
    pub fn builtin() -> Self {
        let mut questions = Vec::new();
        control_flow(&mut questions);
        pointers(&mut questions);
        memory(&mut questions);
        Self { questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Distinct themes in order of first appearance.
    pub fn themes(&self) -> Vec<&str> {
        let mut themes: Vec<&str> = Vec::new();
        for q in &self.questions {
            if !themes.contains(&q.theme()) {
                themes.push(q.theme());
            }
        }
        themes
    }

    /// Questions whose theme matches exactly.
    pub fn by_theme<'a>(&'a self, theme: &'a str) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions.iter().filter(move |q| q.theme() == theme)
    }

    pub fn count_for(&self, theme: &str) -> usize {
        self.by_theme(theme).count()
    }
}

impl From<Vec<Question>> for QuestionBank {
    fn from(questions: Vec<Question>) -> Self {
        Self::new(questions)
    }
}

fn list(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

fn hint(text: &str) -> Option<String> {
    Some(text.to_string())
}

fn push(
    out: &mut Vec<Question>,
    theme: &str,
    prompt: &str,
    question_type: QuestionType,
    options: Option<Vec<String>>,
    answers: Option<Vec<String>>,
    hint: Option<String>,
) {
    match Question::new(theme, prompt, question_type, options, answers, hint) {
        Ok(q) => out.push(q),
        Err(e) => panic!("built-in question is invalid: {e}"),
    }
}

fn push_click(out: &mut Vec<Question>, theme: &str, image: &str, area: Rect, hint: &str) {
    match Question::image_click(theme, CLICK_PROMPT, image, vec![area], Some(hint.to_string())) {
        Ok(q) => out.push(q),
        Err(e) => panic!("built-in question is invalid: {e}"),
    }
}

fn control_flow(out: &mut Vec<Question>) {
    use QuestionType::*;
    let t = THEME_CONTROL_FLOW;

    push(
        out,
        t,
        "What is the output of:\nint a=0;\nif (a) {\n printf(\"yes\");\n} else {\n printf(\"no\");\n}",
        SingleChoice,
        list(&["yes", "no", "error"]),
        list(&["no"]),
        hint("Remember that booleans are secretly integer types."),
    );
    push(
        out,
        t,
        "Which of the following are valid loop types in C? (choose all that apply)",
        MultiChoice,
        list(&["for", "for each", "while", "do while"]),
        list(&["for", "while", "do while"]),
        hint("C does not have a for each loop like some higher level languages."),
    );
    push(
        out,
        t,
        "What does the ternary expression (x > 0 ? x : -x) compute?",
        FreeText,
        None,
        list(&["absolute value", "abs", "absolute"]),
        hint("Absolute value."),
    );
    push(
        out,
        t,
        "Given:\nint i=0;\nwhile(++i < 3){\n printf(\"%d \", i);\n}\nwhat prints?",
        SingleChoice,
        list(&["0 1 2", "1 2", "1 2 3", "2 3", "0 1 2 3", "error"]),
        list(&["1 2"]),
        hint("++i increments i before evaluating the expression as opposed to i++."),
    );
    push(
        out,
        t,
        "Which expression always evaluates to true if the first bit of x is always 1? (choose single)",
        SingleChoice,
        list(&["(x & 1) != 1", "x == 1", "x == 0", "(x ^ 1) == 1", "(x | 1) != 0"]),
        list(&["(x | 1) != 0"]),
        hint("This text is too short to fully explain bitwise operators so look it up."),
    );
    push(
        out,
        t,
        "If you evaluate a complex boolean expression and store the boolean result in a variable, \
         then pass that variable to an if, why might you do that?",
        FreeText,
        None,
        list(&[
            "for clarity",
            "reuse result",
            "to avoid recomputing",
            "to reuse result",
            "for simplicity",
            "for reusability",
            "to avoid recomputation",
            "avoid recomputing",
            "for clarity and reusability",
        ]),
        hint("For clarity and reusability."),
    );
    push(
        out,
        t,
        "How many times will /*code*/ run?\nint i=1;\ndo { /*code*/ } while(i--!=0);",
        Numeric,
        None,
        list(&["2"]),
        hint("The do while loop first runs the code, then checks the result and i-- decrements i \
              only after the expression has been evaluated."),
    );
    push_click(
        out,
        t,
        "images/bitwise_instead_of_logical.png",
        Rect::new(65, 121, 57, 17),
        "Look closely at the condition inside the if statement.",
    );
    push_click(
        out,
        t,
        "images/no_incrementation.png",
        Rect::new(96, 98, 70, 18),
        "Look closely at the condition in the loop.",
    );
    push(
        out,
        t,
        "How many times does printf execute?\nfor(int i=0; i<5; i++) {\n  if(i++ < 3) printf(\"*\");\n}",
        Slider,
        list(&["0", "6", "3"]),
        list(&["2"]),
        hint("i++ in condition uses old value, then increments."),
    );
    push(
        out,
        t,
        "What is x after: int x = -8; x >>= 1; // Assume 32-bit int",
        Slider,
        list(&["-16", "-4", "-8"]),
        list(&["-4"]),
        hint("Right shift on negative (arithmetic shift) fills with 1s."),
    );
    push(
        out,
        t,
        "Given:\nint x = 5 + 3 * 2 >> 1\nwhat is the value of x?",
        Dropdown,
        list(&["1", "2", "3", "5", "6", "8", "11", "error"]),
        list(&["5"]),
        hint("Bitwise operators are always applied last."),
    );
}

fn pointers(out: &mut Vec<Question>) {
    use QuestionType::*;
    let t = THEME_POINTERS;

    push(
        out,
        t,
        "How is a C string stored in memory?",
        SingleChoice,
        list(&[
            "Array of chars terminated by '\\0'",
            "Linked list of chars",
            "Pointer with length field",
            "UTF-8 object",
            "Strings are a primitive data type",
        ]),
        list(&["Array of chars terminated by '\\0'"]),
        hint("Strings are made up of characters in a data structure."),
    );
    push(
        out,
        t,
        "Which of these operations are valid on char *s when s points to a C string? (choose all)",
        MultiChoice,
        list(&["s[0]", "s+\"String\"", "strlen(s)", "s++", "s->len"]),
        list(&["s[0]", "strlen(s)", "s++"]),
        hint("+ is not a valid concatenation operator in C, -> is used to point to a member of a struct."),
    );
    push(
        out,
        t,
        "How many bytes does int arr[6][7] occupy?",
        Numeric,
        None,
        list(&["168"]),
        hint("A standard integer is 4 bytes."),
    );
    push(
        out,
        t,
        "Given char s[] = \"abc\";, what is sizeof(s)?",
        Numeric,
        None,
        list(&["4"]),
        hint("Don't forget about '\\0'."),
    );
    push(
        out,
        t,
        "What is the main difference between array and pointer parameters in function signatures?",
        FreeText,
        None,
        list(&[
            "arrays decay to pointer to first element",
            "array parameter is pointer",
            "size not passed",
            "arrays decay to pointers",
            "they are the same",
            "there is no difference",
        ]),
        hint("Arrays decay to pointers."),
    );
    push(
        out,
        t,
        "Which statement about pointer arithmetic is true? (choose single)",
        SingleChoice,
        list(&[
            "p++ moves by one byte",
            "p++ moves by sizeof(*p) bytes",
            "p++ sets pointer to next bit",
            "p++ is invalid",
        ]),
        list(&["p++ moves by sizeof(*p) bytes"]),
        hint("Moving by 1 byte or 1 bit would lead to undefined behaviour for larger types."),
    );
    push(
        out,
        t,
        "Which memory layout is correct for a 2D array int a[2][3] in C? (choose single)",
        SingleChoice,
        list(&[
            "Column-major contiguous",
            "Array of pointers to rows",
            "Row-major contiguous",
            "Interleaved",
        ]),
        list(&["Row-major contiguous"]),
        hint("Arrays are contiguous."),
    );
    push_click(
        out,
        t,
        "images/missing_terminator.png",
        Rect::new(165, 61, 174, 21),
        "Look closely at the way the string is initialized.",
    );
    push_click(
        out,
        t,
        "images/index_out_of_bounds.png",
        Rect::new(75, 103, 202, 19),
        "Look closely at the for loop condition.",
    );
    push(
        out,
        t,
        "int arr[3][4]; &arr[1][2] - &arr[0][1] equals? (in elements)",
        Slider,
        list(&["0", "6", "3"]),
        list(&["5"]),
        hint("Row-major!"),
    );
    push(
        out,
        t,
        "char *p = \"hello\"; sizeof(p) - sizeof(\"hello\"); gives?",
        Slider,
        list(&["0", "8", "4"]),
        list(&["2"]),
        hint("Pointer size sizeof(p) returns the size of the pointer itself, not what it points to."),
    );
    push(
        out,
        t,
        "char *s1 = \"abc\", *s2 = \"abc\"; s1[1] = 'x'; s2[1] == ?",
        Dropdown,
        list(&["'b'", "'x'", "undefined"]),
        list(&["undefined"]),
        hint("String literals are read-only; modifying = UB."),
    );
}

fn memory(out: &mut Vec<Question>) {
    use QuestionType::*;
    let t = THEME_MEMORY;

    push(
        out,
        t,
        "What happens when you pass an int to a function in C?",
        SingleChoice,
        list(&[
            "reference passed",
            "pointer auto created",
            "value copied (pass-by-value)",
            "global changed",
        ]),
        list(&["value copied (pass-by-value)"]),
        hint("There are no pointers involved."),
    );
    push(
        out,
        t,
        "How do you allocate an array of n ints at runtime?",
        FreeText,
        None,
        list(&["malloc(n * sizeof(int))", "malloc(n * 4)"]),
        hint("Allocating at runtime means the size is not known at compilation time, therefore the \
              size depends on some outside factor, so we use malloc()."),
    );
    push(
        out,
        t,
        "Which functions must be used to free and resize memory allocated by malloc?",
        MultiChoice,
        list(&["delete()", "resize()", "realloc()", "free()", "freeMemory()"]),
        list(&["free()", "realloc()"]),
        None,
    );
    push(
        out,
        t,
        "If you write to *ptr after free(ptr), what is this error called?",
        SingleChoice,
        list(&["use-after-free", "double-free", "memory-leak", "buffer-overflow"]),
        list(&["use-after-free"]),
        None,
    );
    push(
        out,
        t,
        "How do you declare a struct type 'Point' with two ints x and y? (text)",
        FreeText,
        None,
        list(&[
            "typedef struct { int x; int y; } Point;",
            "struct Point { int x; int y; }; typedef struct Point Point;",
            "typedef struct { int x, y; } Point;",
            "struct Point { int x, y; }; typedef struct Point Point;",
            "typedef struct {int x; int y;} Point;",
            "struct Point {int x; int y;}; typedef struct Point Point;",
            "typedef struct {int x, y;} Point;",
            "struct Point {int x, y;}; typedef struct Point Point;",
        ]),
        hint("Use typedef on a struct."),
    );
    push(
        out,
        t,
        "True/False: enums in C are guaranteed to be 4 bytes on all platforms.",
        SingleChoice,
        list(&["True", "False"]),
        list(&["False"]),
        hint("Enums are just integer constants."),
    );
    push(
        out,
        t,
        "When should you use free() in relation to malloc()?",
        FreeText,
        None,
        list(&[
            "when you no longer need the allocated memory",
            "after memory use to avoid leaks",
            "when memory is no longer needed",
            "when allocated memory is no longer needed",
        ]),
        None,
    );
    push_click(
        out,
        t,
        "images/missing_declaration.png",
        Rect::new(47, 64, 77, 19),
        "Look at where the greet() function is declared.",
    );
    push_click(
        out,
        t,
        "images/dangling_pointer.png",
        Rect::new(42, 102, 87, 17),
        "The function returns the address of a local variable.",
    );
    push(
        out,
        t,
        "struct { char c; int i; char d; } s; // sizeof(s) with 4-byte alignment?",
        Slider,
        list(&["6", "12", "8"]),
        list(&["12"]),
        hint("Structs add padding based on the size of the biggest member."),
    );
    push(
        out,
        t,
        "struct { unsigned int a:3; unsigned int b:5; unsigned int c:8; } s; // sizeof(s) on 32-bit system?",
        Slider,
        list(&["0", "4", "2"]),
        list(&["4"]),
        hint("Bitfields are packed into storage units (int=4 bytes); 3+5+8=16 bits, so 4 bytes total."),
    );
    push(
        out,
        t,
        "What is the correct syntax for a function pointer to int func(int)?",
        Dropdown,
        list(&["int *f(int)", "(*int f)(int)", "int (*f)(int)", "int f(*int)"]),
        list(&["int (*f)(int)"]),
        hint("Read right-to-left: pointer to function returning int."),
    );
}

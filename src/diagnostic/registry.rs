/// An entry in the error code registry.
pub struct ErrorEntry {
    pub code: &'static str,
    pub short: &'static str, // one-line description for `explain --list`
    pub long: &'static str,  // full explanation for `explain CODE`
}

/// All stable error codes.
pub static REGISTRY: &[ErrorEntry] = &[
    // ── Conditionals ─────────────────────────────────────────────────────────
    ErrorEntry {
        code: "TPL-C001",
        short: "#ENDIF without a preceding #IF",
        long: r#"## TPL-C001: #ENDIF without a preceding #IF

An `#ENDIF` line was found while no conditional block was open.

**Example that triggers this:**

    #IF WINDOWS
    <Property Id="WIN" />
    #ENDIF
    #ENDIF

Blocks cannot nest: the first `#ENDIF` closes the block, so the second one
has nothing to close. Remove it.
"#,
    },
    ErrorEntry {
        code: "TPL-C002",
        short: "#IF without a flag name",
        long: r#"## TPL-C002: #IF without a flag name

A start marker must name exactly one flag.

**Example that triggers this:**

    #IF

**Fix:**

    #IF WINDOWS
"#,
    },
    ErrorEntry {
        code: "TPL-C003",
        short: "#ENDIF with an argument",
        long: r#"## TPL-C003: #ENDIF with an argument

`#ENDIF` takes no argument. It always closes the block that is open.

**Example that triggers this:**

    #ENDIF WINDOWS

**Fix:**

    #ENDIF
"#,
    },
    ErrorEntry {
        code: "TPL-C004",
        short: "#IF flag is not an identifier",
        long: r#"## TPL-C004: #IF flag is not an identifier

Flags are a single word made of ASCII letters, digits and underscores.
Expressions such as `#IF WINDOWS || LINUX` are not supported. Write one
block per flag instead:

    #IF WINDOWS
    ...
    #ENDIF
    #IF LINUX
    ...
    #ENDIF

Flags that are well formed but never defined are not an error; their
blocks are simply dropped.

Any line starting with `#if` is read as a marker, even when no flags are
defined, so a script comment like `#if ($x)` also fails here. Write it as
`# if ($x)` to keep it as text.
"#,
    },

    // ── Substitution ─────────────────────────────────────────────────────────
    ErrorEntry {
        code: "TPL-S001",
        short: "no value for placeholder",
        long: r#"## TPL-S001: no value for placeholder

A `{%Name%}` token survived conditional filtering but no value named
`Name` was supplied. Nothing is written for the template.

Supply the value in the manifest:

    [values]
    Name = "..."

or on the command line with `--set Name=...`. Placeholders inside blocks
that were filtered out do not need values.
"#,
    },

    // ── Manifest ─────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "TPL-M001",
        short: "cannot read manifest",
        long: r#"## TPL-M001: cannot read manifest

The manifest file could not be opened or is not valid UTF-8.
"#,
    },
    ErrorEntry {
        code: "TPL-M002",
        short: "invalid manifest",
        long: r#"## TPL-M002: invalid manifest

The manifest is not valid TOML or does not have the expected shape.

**Expected shape:**

    [values]
    FullName = "Chaskis IRC Bot"
    License = { file = "LICENSE_1_0.txt" }

    [[template]]
    source = "install/windows/Product.wxs.template"
    target = "install/windows/Product.wxs"
    defines = ["WINDOWS"]
"#,
    },
    ErrorEntry {
        code: "TPL-M003",
        short: "cannot read value file",
        long: r#"## TPL-M003: cannot read value file

A `file` or `first_line` value source points at a file that could not be
read. Relative paths are resolved against the manifest's directory.
"#,
    },
    ErrorEntry {
        code: "TPL-M004",
        short: "invalid value pattern",
        long: r#"## TPL-M004: invalid value pattern

The `pattern` of a value source is not a valid regular expression.
"#,
    },
    ErrorEntry {
        code: "TPL-M005",
        short: "value pattern did not match",
        long: r#"## TPL-M005: value pattern did not match

The `pattern` of a value source found no match in its file. The value is
taken from the named group `value` if the pattern has one, otherwise from
the first capture group, otherwise from the whole match.

**Example:**

    ChaskisMainVersion = { file = "Chaskis/Chaskis.cs", pattern = 'VersionStr\s*=\s*"(?P<value>\d+\.\d+\.\d+)"' }
"#,
    },
    ErrorEntry {
        code: "TPL-M006",
        short: "environment variable not set",
        long: r#"## TPL-M006: environment variable not set

An `env` value source names a variable that is not set, and no `default`
was given.
"#,
    },
    ErrorEntry {
        code: "TPL-M007",
        short: "first_line file is empty",
        long: r#"## TPL-M007: first_line file is empty

A `first_line` value source read a file with no lines. Saved checksum
files must hold the checksum on their first line.
"#,
    },
    ErrorEntry {
        code: "TPL-M008",
        short: "value name is not a placeholder identifier",
        long: r#"## TPL-M008: value name is not a placeholder identifier

Placeholder names are ASCII letters and digits only, so a value named
`Deb-CheckSum` could never be referenced by a `{%...%}` token.
"#,
    },

    // ── Build ────────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "TPL-B001",
        short: "cannot read template",
        long: r#"## TPL-B001: cannot read template

A `[[template]]` source file could not be read.
"#,
    },
    ErrorEntry {
        code: "TPL-B002",
        short: "cannot write target",
        long: r#"## TPL-B002: cannot write target

The rendered output could not be written to the template's `target`.
Parent directories are created as needed; check permissions.
"#,
    },
];

/// Look up an error entry by code (e.g. `"TPL-S001"`). Case-insensitive.
pub fn lookup(code: &str) -> Option<&'static ErrorEntry> {
    REGISTRY.iter().find(|e| e.code.eq_ignore_ascii_case(code))
}

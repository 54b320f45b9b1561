//! LaTeX report assembly.
//!
//! Collects sections, prose, figures and tables into a standalone
//! LaTeX document. SVG figures go through the `svg` package's
//! `\includesvg`, anything else through `\includegraphics`.

use std::fs;
use std::io;
use std::path::Path;

/// A LaTeX document under construction.
#[derive(Debug, Clone)]
pub struct Report {
    title: String,
    body: String,
}

impl Report {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: String::new(),
        }
    }

    pub fn section(&mut self, heading: &str) -> &mut Self {
        self.body.push_str(&format!("\\section{{{}}}\n\n", escape(heading)));
        self
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.body.push_str(&escape(text));
        self.body.push_str("\n\n");
        self
    }

    /// Embeds a figure by path. The extension decides the include macro;
    /// `\includesvg` needs `latex` run with `--shell-escape` and
    /// inkscape available.
    pub fn figure(&mut self, path: &Path, caption: &str) -> &mut Self {
        let include = if path.extension().is_some_and(|e| e == "svg") {
            // includesvg wants the stem, not the full filename.
            format!(
                "\\includesvg[width=0.9\\textwidth]{{{}}}",
                path.with_extension("").display()
            )
        } else {
            format!(
                "\\includegraphics[width=0.9\\textwidth]{{{}}}",
                path.display()
            )
        };
        self.body.push_str(&format!(
            "\\begin{{figure}}[h]\n\\centering\n{}\n\\caption{{{}}}\n\\end{{figure}}\n\n",
            include,
            escape(caption)
        ));
        self
    }

    /// Appends a simple table. Every row must have `headers.len()` cells.
    pub fn table(&mut self, headers: &[&str], rows: &[Vec<String>], caption: &str) -> &mut Self {
        let spec = "l".repeat(headers.len());
        self.body.push_str(&format!(
            "\\begin{{table}}[h]\n\\centering\n\\begin{{tabular}}{{{}}}\n\\hline\n",
            spec
        ));
        let header_row: Vec<String> = headers.iter().map(|h| escape(h)).collect();
        self.body.push_str(&header_row.join(" & "));
        self.body.push_str(" \\\\\n\\hline\n");
        for row in rows {
            let cells: Vec<String> = row.iter().map(|c| escape(c)).collect();
            self.body.push_str(&cells.join(" & "));
            self.body.push_str(" \\\\\n");
        }
        self.body.push_str(&format!(
            "\\hline\n\\end{{tabular}}\n\\caption{{{}}}\n\\end{{table}}\n\n",
            escape(caption)
        ));
        self
    }

    /// Renders the complete document.
    pub fn finish(&self) -> String {
        format!(
            "\\documentclass{{article}}\n\
             \\usepackage{{graphicx}}\n\
             \\usepackage{{svg}}\n\
             \\title{{{}}}\n\
             \\date{{\\today}}\n\
             \\begin{{document}}\n\
             \\maketitle\n\n\
             {}\\end{{document}}\n",
            escape(&self.title),
            self.body
        )
    }

    /// Writes the rendered document to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.finish())
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

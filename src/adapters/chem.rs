//! Open Babel backed implementation of [`MoleculeToolkit`].

use crate::core::molfile::MolBlock;
use crate::domain::model::MoleculeDescription;
use crate::domain::ports::MoleculeToolkit;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const OBABEL: &str = "obabel";

/// Runs the `obabel` executable with the structure on stdin.
#[derive(Debug, Clone)]
pub struct OpenBabelToolkit {
    program: PathBuf,
}

impl OpenBabelToolkit {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `obabel` on `PATH`.
    pub fn locate() -> Result<Self> {
        let path = std::env::var_os("PATH").unwrap_or_default();
        find_in(std::env::split_paths(&path), OBABEL)
            .map(Self::new)
            .ok_or_else(|| EtlError::MissingTool(OBABEL.to_string()))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    async fn run(&self, args: &[&str], input: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(args)
            // Open Babel 的警告訊息只會干擾輸出
            .args(["---errorlevel", "0"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| EtlError::Toolkit {
                message: format!("failed to start {}: {}", self.program.display(), err),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| EtlError::Toolkit {
            message: format!("no stdin for {}", self.program.display()),
        })?;
        // stdout 必須同時讀取，否則大的輸入會塞滿 pipe
        let write = async move {
            let written = stdin.write_all(input.as_bytes()).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(EtlError::Toolkit {
                message: if stderr.is_empty() {
                    format!("{} exited with {}", self.program.display(), output.status)
                } else {
                    stderr
                },
            });
        }
        written?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn non_empty(output: String, what: &str, inchi: &str) -> Result<String> {
        if output.is_empty() {
            return Err(EtlError::Toolkit {
                message: format!("no {} produced for {}", what, inchi),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl MoleculeToolkit for OpenBabelToolkit {
    async fn mol_to_inchi(&self, mol_block: &str) -> Result<Option<String>> {
        let inchi = self.run(&["-imol", "-oinchi"], mol_block).await?;
        Ok(inchi
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("InChI="))
            .map(str::to_string))
    }

    async fn describe_inchi(&self, inchi: &str) -> Result<MoleculeDescription> {
        let inchi_key = Self::non_empty(
            self.run(&["-iinchi", "-oinchikey"], inchi).await?,
            "InChIKey",
            inchi,
        )?;
        let descriptors = self
            .run(&["-iinchi", "-ocan", "-xn", "--append", "formula MW"], inchi)
            .await?;
        let (smiles, chemical_formula, mass) = parse_descriptor_line(&descriptors)?;
        let mol = self.run(&["-iinchi", "-omol"], inchi).await?;
        let charge = MolBlock::parse(&mol)?.formal_charge();

        Ok(MoleculeDescription {
            inchi_key: inchi_key.lines().next().unwrap_or_default().trim().to_string(),
            smiles,
            chemical_formula,
            mass,
            charge,
        })
    }
}

/// Split `<smiles> <formula> <MW>` as written by `-ocan --append "formula MW"`.
fn parse_descriptor_line(line: &str) -> Result<(String, String, f64)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [smiles, formula, mass] = fields.as_slice() else {
        return Err(EtlError::Toolkit {
            message: format!("unexpected descriptor output: {:?}", line),
        });
    };
    let mass: f64 = mass.parse().map_err(|_| EtlError::Toolkit {
        message: format!("molecular weight is not a number: {:?}", mass),
    })?;
    Ok((smiles.to_string(), formula.to_string(), mass))
}

fn find_in<I>(dirs: I, name: &str) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

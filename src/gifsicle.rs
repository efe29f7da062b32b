use std::{path::PathBuf, process::Stdio};

use tokio::{io::AsyncWriteExt, process::Command};

use crate::{
    error::{EmoteError, Result},
    transform::{Op, Transformer},
};

/// Runs gifsicle as a child process, piping the GIF through stdin and stdout.
#[derive(Clone, Debug)]
pub struct Gifsicle {
    program: PathBuf,
}

impl Gifsicle {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, data: &[u8], args: &[String]) -> Result<Vec<u8>> {
        tracing::debug!(program = %self.program.display(), ?args, "running gifsicle");

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| EmoteError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            EmoteError::Io(std::io::Error::other("failed to open gifsicle stdin"))
        })?;

        // Feed stdin while draining stdout so neither pipe fills up
        let write = async move {
            stdin.write_all(data).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            tracing::warn!(status = %output.status, %stderr, "gifsicle failed");
            return Err(EmoteError::Transform {
                status: output.status.to_string(),
                stderr,
            });
        }
        written?;

        Ok(output.stdout)
    }
}

impl Default for Gifsicle {
    fn default() -> Self {
        Self::new("gifsicle")
    }
}

impl Transformer for Gifsicle {
    async fn transform(&self, data: &[u8], ops: &[Op]) -> Result<Vec<u8>> {
        let args: Vec<String> = ops.iter().flat_map(Op::args).collect();
        self.run(data, &args).await
    }

    async fn info(&self, data: &[u8]) -> Result<String> {
        let output = self.run(data, &["-I".to_owned()]).await?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use image::{Frame, Rgba, RgbaImage};

    use super::*;
    use crate::{
        codec::{decode_animation, encode_animation},
        transform::frame_count_from_info,
        utils::{get_delay, get_delay_centisecs},
    };

    fn available() -> bool {
        std::process::Command::new("gifsicle")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn sample(count: usize) -> Vec<u8> {
        let frames = (0..count)
            .map(|index| {
                Frame::from_parts(
                    RgbaImage::from_pixel(8, 8, Rgba([(index * 30) as u8, 50, 50, 255])),
                    0,
                    0,
                    get_delay(6),
                )
            })
            .collect();
        encode_animation(frames, 10).unwrap()
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let result = Gifsicle::new("/nonexistent/gifsicle")
            .transform(&sample(1), &[Op::Optimize])
            .await;

        assert!(matches!(result, Err(EmoteError::Spawn { .. })));
    }

    #[tokio::test]
    async fn delays_and_info() {
        if !available() {
            eprintln!("gifsicle not found, skipping");
            return;
        }

        let gifsicle = Gifsicle::default();
        let data = sample(4);

        let info = gifsicle.info(&data).await.unwrap();
        assert_eq!(frame_count_from_info(&info), 4);

        let output = gifsicle
            .transform(&data, &[Op::Unoptimize, Op::Delay(2), Op::Delete(vec![1, 3])])
            .await
            .unwrap();
        let animation = decode_animation(&output).unwrap();
        assert_eq!(animation.frames.len(), 2);
        assert_eq!(get_delay_centisecs(animation.frames[0].delay()), 2);
    }

    #[tokio::test]
    async fn garbage_input_keeps_stderr() {
        if !available() {
            eprintln!("gifsicle not found, skipping");
            return;
        }

        let result = Gifsicle::default()
            .transform(b"not a gif at all", &[Op::Optimize])
            .await;

        match result {
            Err(EmoteError::Transform { stderr, .. }) => assert!(!stderr.is_empty()),
            other => panic!("expected transform error, got {other:?}"),
        }
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

static ROOT_WRITE_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

/// The write lock shared by every `StoreFolder` on `root` in this process.
///
/// Keyed by the canonical path, so `dir`, `./dir` and symlinked spellings share one lock.
fn root_write_lock(root: &Path) -> Arc<Mutex<()>> {
    // Canonicalization needs an existing directory; a failure here resurfaces on the write.
    let _ = fs::create_dir_all(root);
    let key = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let mut locks = ROOT_WRITE_LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    locks.entry(key).or_default().clone()
}

fn read_json<T: for<'de> Deserialize<'de>>(
    path: &Path,
    resource: impl FnOnce() -> String,
) -> Result<T, FetchError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(FetchError::NotFound { resource: resource() });
        }
        Err(source) => return Err(FetchError::Io { path: path.to_path_buf(), source }),
    };
    serde_json::from_str(&raw).map_err(|source| FetchError::Json { path: path.to_path_buf(), source })
}

fn write_json<T: Serialize>(
    path: &Path,
    value: &T,
    durability: WriteDurability,
) -> Result<(), WriteError> {
    let mut contents = serde_json::to_vec_pretty(value)
        .map_err(|source| WriteError::Json { path: path.to_path_buf(), source })?;
    contents.push(b'\n');
    write_atomic(path, &contents, durability)
        .map_err(|source| WriteError::Io { path: path.to_path_buf(), source })
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| io::Error::other("path has no parent"))?;
    let file_name = path.file_name().ok_or_else(|| io::Error::other("path has no file name"))?;
    fs::create_dir_all(parent)?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(io::Error::other("refusing to write through symlink"));
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let tmp_path =
        parent.join(format!(".nereid-wiki.tmp.{}.{nanos}", file_name.to_string_lossy()));

    let mut file = fs::OpenOptions::new().write(true).create_new(true).open(&tmp_path)?;
    let written = file.write_all(contents).and_then(|()| match durability {
        WriteDurability::Durable => file.sync_all(),
        WriteDurability::BestEffort => Ok(()),
    });
    drop(file);
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    if let Err(err) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            fs::File::open(parent)?.sync_all()?;
        }
    }

    Ok(())
}

//! Error types for sprite and palette file parsing.

use std::fmt;

use thiserror::Error;

/// File formats handled by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// `.dc6` flat sprite sheets
	Dc6,
	/// `.dcc` compressed sprite sheets
	Dcc,
	/// `.pl2` palette transform tables
	Pl2,
	/// `.dat` base palettes
	Dat,
}

impl fmt::Display for FileType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Dc6 => "DC6",
			Self::Dcc => "DCC",
			Self::Pl2 => "PL2",
			Self::Dat => "DAT",
		};
		f.write_str(name)
	}
}

/// Errors that can occur when decoding or encoding sprite and palette files.
#[derive(Debug, Error)]
pub enum FileError {
	/// The extension does not name a supported sprite format
	#[error("Unsupported file format: {extension:?}")]
	UnsupportedFormat {
		/// Extension (or path) that was rejected
		extension: String,
	},

	/// Not enough data to parse
	#[error("{file_type}: insufficient data, expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Format being parsed
		file_type: FileType,
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// Signature byte or tag mismatch
	#[error("{file_type}: invalid signature, expected {expected:#X}, got {actual:#X}")]
	InvalidSignature {
		/// Format being parsed
		file_type: FileType,
		/// Expected value
		expected: u32,
		/// Value found in the data
		actual: u32,
	},

	/// Unsupported format version
	#[error("{file_type}: unsupported version {version}")]
	InvalidVersion {
		/// Format being parsed
		file_type: FileType,
		/// Version found in the header
		version: i32,
	},

	/// Malformed body data
	#[error("{file_type}: corrupt data, {message}")]
	CorruptData {
		/// Format being parsed
		file_type: FileType,
		/// What went wrong
		message: String,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

impl FileError {
	/// Creates an `InsufficientData` error.
	pub fn insufficient_data(file_type: FileType, expected: usize, actual: usize) -> Self {
		Self::InsufficientData {
			file_type,
			expected,
			actual,
		}
	}

	/// Creates a `CorruptData` error.
	pub fn corrupt(file_type: FileType, message: impl Into<String>) -> Self {
		Self::CorruptData {
			file_type,
			message: message.into(),
		}
	}

	/// Creates an `UnsupportedFormat` error.
	pub fn unsupported(extension: impl Into<String>) -> Self {
		Self::UnsupportedFormat {
			extension: extension.into(),
		}
	}

	/// Returns `true` when the error means the byte stream does not match the
	/// expected binary layout.
	pub fn is_corrupt_data(&self) -> bool {
		matches!(
			self,
			Self::InsufficientData { .. }
				| Self::InvalidSignature { .. }
				| Self::InvalidVersion { .. }
				| Self::CorruptData { .. }
		)
	}

	/// Returns the file type the error relates to, if any.
	pub fn file_type(&self) -> Option<FileType> {
		match self {
			Self::InsufficientData {
				file_type,
				..
			}
			| Self::InvalidSignature {
				file_type,
				..
			}
			| Self::InvalidVersion {
				file_type,
				..
			}
			| Self::CorruptData {
				file_type,
				..
			} => Some(*file_type),
			Self::UnsupportedFormat {
				..
			}
			| Self::IOError(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_corrupt_classification() {
		assert!(FileError::insufficient_data(FileType::Dc6, 24, 3).is_corrupt_data());
		assert!(FileError::corrupt(FileType::Dcc, "bad").is_corrupt_data());
		assert!(!FileError::unsupported("png").is_corrupt_data());
		assert_eq!(FileError::corrupt(FileType::Pl2, "x").file_type(), Some(FileType::Pl2));
	}

	#[test]
	fn test_display() {
		let err = FileError::insufficient_data(FileType::Dc6, 24, 3);
		assert_eq!(err.to_string(), "DC6: insufficient data, expected 24 bytes, got 3 bytes");
	}
}

//! CargoHold のコア契約
//!
//! イメージ参照・オブジェクトキー・アーカイブストリームのモデルと、
//! コンテナエンジン側（Archive Bridge）/ オブジェクトストレージ側
//! （Object Transfer）の2つの契約、およびその上で動く push / pull の
//! オーケストレーションを提供する。

pub mod archive;
pub mod error;
pub mod key;
pub mod reference;
pub mod transfer;

pub use archive::*;
pub use error::*;
pub use key::*;
pub use reference::*;
pub use transfer::*;

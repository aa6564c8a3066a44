//! Database entities

pub mod project;
pub mod project_manager;
pub mod question;
pub mod question_team;
pub mod status_record;
pub mod team;
pub mod team_member;
pub mod user;

pub use project::Entity as Project;
pub use project_manager::Entity as ProjectManager;
pub use question::Entity as Question;
pub use question_team::Entity as QuestionTeam;
pub use status_record::Entity as StatusRecord;
pub use team::Entity as Team;
pub use team_member::Entity as TeamMember;
pub use user::Entity as User;

pub mod prelude {
    pub use super::project::Entity as Project;
    pub use super::project_manager::Entity as ProjectManager;
    pub use super::question::Entity as Question;
    pub use super::question_team::Entity as QuestionTeam;
    pub use super::status_record::Entity as StatusRecord;
    pub use super::team::Entity as Team;
    pub use super::team_member::Entity as TeamMember;
    pub use super::user::Entity as User;
}

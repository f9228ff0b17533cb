mod common;

use common::{at, TestGym};
use gym_crm::{Account, Trainer, TrainingType};

fn usernames(trainers: &[Trainer]) -> Vec<&str> {
    trainers.iter().map(|trainer| trainer.username()).collect()
}

#[cfg(test)]
mod unassigned_trainers_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_excludes_only_trainers_paired_with_the_trainee() {
        let gym = TestGym::new();
        let anna = gym.trainee("Anna", "Lee").await;
        let dave = gym.trainee("Dave", "Moss").await;
        let bob = gym.trainer("Bob", "Stone", TrainingType::Yoga).await;
        let carla = gym.trainer("Carla", "Lopez", TrainingType::Zumba).await;
        gym.trainer("Eve", "Nash", TrainingType::Stretching).await;

        // Bob mostly trains Dave, but one session with Anna is enough.
        gym.training(&dave, &bob, TrainingType::Yoga, at(2024, 1, 5, 9)).await;
        gym.training(&dave, &bob, TrainingType::Yoga, at(2024, 1, 6, 9)).await;
        gym.training(&anna, &bob, TrainingType::Yoga, at(2024, 1, 7, 9)).await;
        gym.training(&dave, &carla, TrainingType::Zumba, at(2024, 1, 8, 9)).await;

        let unassigned = gym.trainers.find_unassigned_trainers("Anna.Lee").await.unwrap();

        assert_eq!(usernames(&unassigned), vec!["Carla.Lopez", "Eve.Nash"]);
    }

    #[tokio::test]
    async fn test_trainee_without_trainings_sees_every_trainer() {
        let gym = TestGym::new();
        gym.trainee("Anna", "Lee").await;
        gym.trainer("Bob", "Stone", TrainingType::Yoga).await;
        gym.trainer("Carla", "Lopez", TrainingType::Zumba).await;

        let unassigned = gym.trainers.find_unassigned_trainers("Anna.Lee").await.unwrap();

        assert_eq!(usernames(&unassigned), vec!["Bob.Stone", "Carla.Lopez"]);
    }

    #[tokio::test]
    async fn test_unknown_trainee_sees_every_trainer() {
        let gym = TestGym::new();
        gym.trainer("Bob", "Stone", TrainingType::Yoga).await;

        let unassigned = gym.trainers.find_unassigned_trainers("Nobody.Here").await.unwrap();

        assert_eq!(usernames(&unassigned), vec!["Bob.Stone"]);
    }

    #[tokio::test]
    async fn test_no_trainers_registered() {
        let gym = TestGym::new();
        gym.trainee("Anna", "Lee").await;

        let unassigned = gym.trainers.find_unassigned_trainers("Anna.Lee").await.unwrap();

        assert!(unassigned.is_empty());
    }
}
